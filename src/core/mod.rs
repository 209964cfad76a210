//! Core Components
//!
//! HTTP transport infrastructure shared by the issuer and the orchestrator.

pub mod loopback;
pub mod transport;

pub use loopback::*;
pub use transport::*;
