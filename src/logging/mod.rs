pub mod runtime_logger;
pub mod serving_log;

pub use runtime_logger::RuntimeLogger;
pub use serving_log::ServingLog;
