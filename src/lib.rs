// Library interface for cpfit
// Allows integration tests to access the core fit and depletion functions

pub mod config;
pub mod depletion;
pub mod error;
pub mod logging;
pub mod model;
pub mod report;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use depletion::power_for_fraction;
pub use error::{CpFitError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use model::{CpModel, FitResult};
pub use report::DepletionTarget;
