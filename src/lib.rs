pub mod config;
pub mod error;
pub mod market_data;
pub mod server;
pub mod telemetry;
pub mod tools;

pub use error::{BridgeError, Result};
