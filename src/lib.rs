pub mod config;
pub mod error;
pub mod http;
pub mod logger;
pub mod runner;
pub mod suite;
pub mod utils;

// Re-export commonly used types
pub use error::{ProbeError, Result};
