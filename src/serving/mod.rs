pub mod pipeline;
pub mod predictor;

pub use pipeline::{EligibleAdsPipeline, ServingResult};
pub use predictor::{AdPredictor, SegmentMatchPredictor};
