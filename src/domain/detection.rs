use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::metrics;

/// Object class as named by the model's label table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectClass {
    Ship,
    Cargo,
    Island,
    Cloud,
    Other(String),
}

impl ObjectClass {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "ship" => Self::Ship,
            "cargo" => Self::Cargo,
            "island" => Self::Island,
            "cloud" => Self::Cloud,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Ship => "ship",
            Self::Cargo => "cargo",
            Self::Island => "island",
            Self::Cloud => "cloud",
            Self::Other(name) => name,
        }
    }

    /// Classes for which length and collision-risk heuristics apply.
    pub fn is_tonnage_bearing(&self) -> bool {
        matches!(self, Self::Ship | Self::Cargo)
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for ObjectClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ObjectClass {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

/// Detector output before any synthesis: source-pixel box, score in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDetection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub score: f32,
    pub class_id: usize,
    pub label: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    /// Truncates to whole pixels and orders the corners so x1 <= x2, y1 <= y2.
    pub fn from_corners(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        let (x1, y1, x2, y2) = (x1 as i32, y1 as i32, x2 as i32, y2 as i32);
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    pub fn width(&self) -> u32 {
        self.x1.abs_diff(self.x2)
    }

    pub fn height(&self) -> u32 {
        self.y1.abs_diff(self.y2)
    }
}

/// One recognized region with its derived, illustrative metrics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Detection {
    pub class: ObjectClass,
    pub confidence: f64,
    pub bounding_box: BoundingBox,
    pub length_m: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl Detection {
    pub fn from_raw(raw: &RawDetection) -> Self {
        let bbox = BoundingBox::from_corners(raw.x1, raw.y1, raw.x2, raw.y2);
        let (latitude, longitude) = metrics::pseudo_coordinates(bbox.x1, bbox.y1);
        Self {
            class: ObjectClass::from_label(&raw.label),
            confidence: metrics::confidence_percent(raw.score),
            length_m: metrics::pseudo_length(bbox.x1, bbox.x2),
            bounding_box: bbox,
            latitude,
            longitude,
        }
    }

    /// The four label lines drawn next to the box.
    pub fn label_lines(&self) -> [String; 4] {
        [
            format!("Object: {}", self.class),
            format!("Confidence: {}%", metrics::format_decimal(self.confidence)),
            format!("Length: {} meters", metrics::format_decimal(self.length_m)),
            format!(
                "Coordinates: ({}, {})",
                metrics::format_decimal(self.latitude),
                metrics::format_decimal(self.longitude)
            ),
        ]
    }
}
