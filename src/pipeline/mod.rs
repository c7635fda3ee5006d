//! Headless drive loop and observer implementations.

pub mod observers;
pub mod training;

pub use observers::{JsonlObserver, MetricsObserver, ProgressObserver};
pub use training::{TrainingConfig, TrainingPipeline, TrainingResult};
