//! Builders
//!
//! Fluent builder for task client configuration.

pub mod config;

pub use config::{task_config, TaskConfigBuilder};
