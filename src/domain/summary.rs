use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::detection::{Detection, ObjectClass};
use super::media::VideoInfo;
use super::metrics;

/// Cloud detections at or above this count make the sky "Cloudy".
pub const CLOUDY_THRESHOLD: usize = 2;
/// Ship + cargo detections at or above this count raise a caution.
pub const CAUTION_THRESHOLD: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Weather {
    Clear,
    Cloudy,
}

impl Weather {
    pub fn from_cloud_count(clouds: usize) -> Self {
        if clouds < CLOUDY_THRESHOLD { Self::Clear } else { Self::Cloudy }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Clear => "Clear Skies",
            Self::Cloudy => "Cloudy",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RiskLevel {
    NoRisk,
    Caution,
}

impl RiskLevel {
    pub fn from_vessel_count(vessels: usize) -> Self {
        if vessels < CAUTION_THRESHOLD { Self::NoRisk } else { Self::Caution }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NoRisk => "No Collision Risks",
            Self::Caution => "Caution: High Density",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassCount {
    pub class: ObjectClass,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectDetail {
    pub class: ObjectClass,
    pub length_m: f64,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Speed {
    pub knots: f64,
}

impl Speed {
    pub fn from_video(info: &VideoInfo) -> Self {
        Self { knots: metrics::fake_speed_knots(info.frame_count, info.fps) }
    }

    pub fn label(&self) -> String {
        format!("{} knots", metrics::format_decimal(self.knots))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub total_objects: usize,
    /// Ordered by first appearance in the detection list.
    pub class_counts: Vec<ClassCount>,
    pub ship_count: usize,
    pub cargo_count: usize,
    pub cloud_count: usize,
    pub island_count: usize,
    pub avg_confidence: f64,
    pub max_length_m: f64,
    pub weather: Weather,
    pub risk: Option<RiskLevel>,
    pub detected_at: NaiveDate,
    pub speed: Option<Speed>,
    pub objects: Vec<ObjectDetail>,
}

impl Summary {
    /// Plain-text overview shown under the annotated media.
    pub fn render_report(&self) -> String {
        let mut out = String::from("Detection Overview:\n");
        out.push_str(&format!("- Total Objects Detected: {}\n", self.total_objects));
        for cc in &self.class_counts {
            out.push_str(&format!("  - {}: {}\n", capitalize(cc.class.name()), cc.count));
        }
        out.push_str(&format!(
            "- Avg Confidence: {}%\n",
            metrics::format_decimal(self.avg_confidence)
        ));
        out.push_str(&format!(
            "- Max Ship Length: {} m\n",
            metrics::format_decimal(self.max_length_m)
        ));
        out.push_str(&format!("- Weather: {}\n", self.weather.label()));
        out.push_str(&format!(
            "- Risk: {}\n",
            self.risk.map(|r| r.label()).unwrap_or_default()
        ));
        out.push_str(&format!("- Detected At: {} UTC\n", self.detected_at.format("%Y-%m-%d")));
        out.push_str(&format!(
            "- Speed: {}\n",
            self.speed.as_ref().map(Speed::label).unwrap_or_default()
        ));
        if !self.objects.is_empty() {
            out.push_str("\nObjects:\n");
            for obj in &self.objects {
                out.push_str(&format!(
                    "- {}: Length: {} m, Coordinates: ({}, {})\n",
                    capitalize(obj.class.name()),
                    metrics::format_decimal(obj.length_m),
                    metrics::format_decimal(obj.latitude),
                    metrics::format_decimal(obj.longitude),
                ));
            }
        }
        out
    }
}

/// Reduces one file's detections into its summary, dated today (UTC).
pub fn summarize(detections: &[Detection], video: Option<&VideoInfo>) -> Summary {
    summarize_at(detections, video, Utc::now().date_naive())
}

pub fn summarize_at(
    detections: &[Detection],
    video: Option<&VideoInfo>,
    detected_at: NaiveDate,
) -> Summary {
    let mut class_counts: Vec<ClassCount> = Vec::new();
    let mut confidence_sum = 0.0;
    let mut max_length_m: f64 = 0.0;
    let mut has_tonnage = false;

    for det in detections {
        match class_counts.iter_mut().find(|c| c.class == det.class) {
            Some(entry) => entry.count += 1,
            None => class_counts.push(ClassCount { class: det.class.clone(), count: 1 }),
        }
        confidence_sum += det.confidence;
        if det.class.is_tonnage_bearing() {
            has_tonnage = true;
            max_length_m = max_length_m.max(det.length_m);
        }
    }

    let total_objects: usize = class_counts.iter().map(|c| c.count).sum();
    let ship_count = count_of(&class_counts, &ObjectClass::Ship);
    let cargo_count = count_of(&class_counts, &ObjectClass::Cargo);
    let cloud_count = count_of(&class_counts, &ObjectClass::Cloud);
    let island_count = count_of(&class_counts, &ObjectClass::Island);

    let avg_confidence = if total_objects > 0 {
        metrics::round2(confidence_sum / total_objects as f64)
    } else {
        0.0
    };

    let risk = has_tonnage.then(|| RiskLevel::from_vessel_count(ship_count + cargo_count));

    Summary {
        total_objects,
        class_counts,
        ship_count,
        cargo_count,
        cloud_count,
        island_count,
        avg_confidence,
        max_length_m,
        weather: Weather::from_cloud_count(cloud_count),
        risk,
        detected_at,
        speed: video.map(Speed::from_video),
        objects: detections
            .iter()
            .map(|d| ObjectDetail {
                class: d.class.clone(),
                length_m: d.length_m,
                latitude: d.latitude,
                longitude: d.longitude,
            })
            .collect(),
    }
}

fn count_of(class_counts: &[ClassCount], class: &ObjectClass) -> usize {
    class_counts.iter().find(|c| &c.class == class).map_or(0, |c| c.count)
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
