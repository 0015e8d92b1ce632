//! Core types for the deployment toolkit.
//!
//! This module provides foundational types used throughout the system:
//! - **IDs**: Strongly-typed identifiers (ProcessId, MessageId, ModuleId)
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Immutable per-invocation configuration resolved from the
//!   environment at startup

mod config;
mod errors;
mod ids;

pub use config::{
    DeployConfig, InitSettings, SendConfig, DEFAULT_APP_NAME, DEFAULT_AUTHORITY,
    DEFAULT_CU_URL, DEFAULT_INIT_DELAY_MS, DEFAULT_MODULE_ID, DEFAULT_MU_URL,
    DEFAULT_SCHEDULER, DEFAULT_SPAWN_DATA,
};
pub use errors::{Error, Result};
pub use ids::{MessageId, ModuleId, ProcessId};
