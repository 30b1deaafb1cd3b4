//! drcom-rs Core Library
//!
//! This crate provides the error taxonomy, the shared wire newtypes and the
//! session model used by every other crate of the Drcom client.

pub mod error;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use session::{GatewayProfile, Session, SessionState};
pub use types::*;
