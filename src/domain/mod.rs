pub mod annotation;
pub mod detection;
pub mod errors;
pub mod media;
pub mod metrics;
pub mod model;
pub mod summary;
