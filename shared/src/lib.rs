//! Shared types for the salesman credit service
//!
//! Domain models and small helpers used by both the credit server and the
//! platform client crate. No business logic lives here.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
