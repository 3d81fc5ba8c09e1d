pub mod config;
pub mod error;
pub mod identity;
pub mod message;
pub mod profile;
pub mod report;

// Re-export common error type
pub use error::{CourierError, Result};
