//! # ao-deploy - AO Process Deployment Toolkit
//!
//! Rust tooling for deploying and operating AO processes on the permaweb:
//! - Spawn a fresh process against an aos module and scheduler
//! - Load executable Lua source into it with an `Eval` message
//! - Optionally run a one-time `Init` handler after a settling delay
//! - Send ad-hoc action messages (dry-run or signed write) to any process
//!
//! ## Architecture
//!
//! Each invocation runs one linear sequence of awaited steps:
//! ```text
//!   DeployConfig ──► Deployment state machine
//!                    Created → Spawned → Evaluated → Initialized
//!                       spawn │    Eval │     Init (after delay)
//!                             └─ Failed ◄┘   (on transport error)
//!
//!   Dispatcher ──► Gateway (trait) ──► HTTP messenger/compute units
//!                         └──────────► recording mock (tests)
//! ```
//!
//! The `Gateway` and `Signer` traits are the seams to the external
//! collaborators: the network units that accept spawns, messages, and
//! dry-runs, and the wallet that signs committed messages.

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

// Re-export public API
pub mod ans104;
pub mod deploy;
pub mod dispatch;
pub mod gateway;
pub mod interpret;
pub mod tags;
pub mod types;
pub mod wallet;

// Internal utilities
pub mod observability;
pub mod validation;

pub use types::{DeployConfig, Error, Result, SendConfig};
