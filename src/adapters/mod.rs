pub mod http;
pub mod media;
pub mod onnx;
pub mod render;
pub mod storage;
