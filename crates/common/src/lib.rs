//! Shared infrastructure for the Cropsight client core
//!
//! Holds the pieces every other crate leans on: environment-driven
//! configuration and tracing setup.

pub mod config;
pub mod telemetry;

pub use config::ClientConfig;
