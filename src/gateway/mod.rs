//! Network seam to the AO units.
//!
//! The [`Gateway`] trait is the boundary to the external collaborators that
//! accept spawns, signed messages, and dry-runs. Production traffic goes
//! through [`HttpGateway`]; tests drive the workflow against the recording
//! gateway in [`mock`].

mod http;
pub mod mock;

pub use http::HttpGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tags::Tag;
use crate::types::{MessageId, ModuleId, ProcessId, Result};
use crate::wallet::Signer;

/// Arguments for creating a new process identity.
#[derive(Debug, Clone, Copy)]
pub struct SpawnRequest<'a> {
    /// Module the process executes.
    pub module: &'a ModuleId,
    /// Scheduler unit the process is assigned to.
    pub scheduler: &'a str,
    /// Caller tags, in order. Protocol tags are appended beneath this seam.
    pub tags: &'a [Tag],
    /// Spawn item payload.
    pub data: &'a str,
}

/// Submission and spawn primitives of the compute network.
#[async_trait]
pub trait Gateway: Send + Sync + fmt::Debug {
    /// Create a new process identity. Returns once the messenger unit
    /// acknowledges the spawn. The process is addressable immediately but
    /// has no executable behavior until an Eval message is applied.
    async fn spawn(&self, request: SpawnRequest<'_>, signer: &dyn Signer) -> Result<ProcessId>;

    /// Sign and durably submit a message, then read its evaluation result
    /// from the compute unit.
    async fn message(
        &self,
        target: &ProcessId,
        tags: &[Tag],
        data: Option<&str>,
        signer: &dyn Signer,
    ) -> Result<(MessageId, ActionResult)>;

    /// Evaluate a message against current process state without persisting
    /// any effect. No signature, no fees, no message id.
    async fn dry_run(
        &self,
        target: &ProcessId,
        tags: &[Tag],
        data: Option<&str>,
    ) -> Result<ActionResult>;
}

/// Result of evaluating a message against a process, as compute units
/// report it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionResult {
    #[serde(rename = "Messages", default)]
    pub messages: Vec<OutboxMessage>,

    #[serde(rename = "Spawns", default)]
    pub spawns: Vec<serde_json::Value>,

    #[serde(rename = "Output", default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,

    /// Populated when the process's own handler rejected or failed the
    /// request. A string or a structured value, depending on the handler.
    #[serde(rename = "Error", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,

    #[serde(rename = "GasUsed", default, skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<u64>,
}

impl ActionResult {
    /// The `Error` field, when present and non-empty.
    pub fn error_text(&self) -> Option<String> {
        match &self.error {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) if s.is_empty() => None,
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }

    /// Data of the first outbox message: the canonical success payload.
    pub fn first_message_data(&self) -> Option<String> {
        let data = self.messages.first()?.data.as_ref()?;
        Some(match data {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// A message the process queued in its outbox while evaluating.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutboxMessage {
    #[serde(rename = "Target", default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(rename = "Data", default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    #[serde(rename = "Anchor", default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,

    #[serde(rename = "Tags", default)]
    pub tags: Vec<Tag>,
}
