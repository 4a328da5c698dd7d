//! Ship & object detection dashboard.
//!
//! Uploaded images go through a YOLO-style ONNX detector, get annotated with
//! boxes and illustrative pixel-derived metrics, and are summarized; videos
//! only get a decorative speed figure.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
