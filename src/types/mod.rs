//! Task Types
//!
//! Data structures shared by the issuer, target endpoint and orchestrator.

mod config;
mod outcome;
mod task;
mod token;

pub use config::*;
pub use outcome::*;
pub use task::*;
pub use token::*;
