//! Pixel-derived demo metrics.
//!
//! None of these values are measurements: lengths are box widths scaled by π,
//! coordinates are a fixed harbor anchor nudged by pixel position and the
//! video speed is a function of clip duration only.

use std::f64::consts::PI;

/// Anchor latitude/longitude that pseudo-coordinates are offset from.
pub const ANCHOR_LATITUDE: f64 = 23.8103;
pub const ANCHOR_LONGITUDE: f64 = 90.4125;
pub const DEGREES_PER_PIXEL: f64 = 0.00001;

pub const BASE_SPEED_KNOTS: f64 = 10.0;
pub const KNOTS_PER_SECOND: f64 = 0.5;

/// Two-decimal rounding of the exact binary value, ties to even.
/// Scaling by 100 first would round an already inexact product.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Detector score in [0, 1] to a percentage with two decimals.
pub fn confidence_percent(score: f32) -> f64 {
    round2(f64::from(score) * 100.0)
}

pub fn pseudo_length(x1: i32, x2: i32) -> f64 {
    round2(f64::from(x1.abs_diff(x2)) * PI)
}

/// Returns `(latitude, longitude)`.
pub fn pseudo_coordinates(x1: i32, y1: i32) -> (f64, f64) {
    let latitude = round2(ANCHOR_LATITUDE + f64::from(y1) * DEGREES_PER_PIXEL);
    let longitude = round2(ANCHOR_LONGITUDE + f64::from(x1) * DEGREES_PER_PIXEL);
    (latitude, longitude)
}

/// Clip duration in seconds; a zero (or unusable) frame rate counts as one second.
pub fn video_duration_secs(frame_count: u64, fps: f64) -> f64 {
    if fps.is_finite() && fps > 0.0 {
        frame_count as f64 / fps
    } else {
        1.0
    }
}

pub fn fake_speed_knots(frame_count: u64, fps: f64) -> f64 {
    round2(BASE_SPEED_KNOTS + video_duration_secs(frame_count, fps) * KNOTS_PER_SECOND)
}

/// Renders a decimal the way the dashboard shows it: whole numbers keep one
/// trailing zero (`15.0`), everything else prints its shortest form.
pub fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
