pub mod detector;
pub mod labels;
pub mod model_catalog;
pub mod postprocess;
#[cfg(feature = "onnx")]
pub mod yolo_engine;
