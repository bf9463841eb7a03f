pub mod config;
pub mod error;
pub mod loyalty;
pub mod permissions;
pub mod telemetry;
