//! Recording gateway and fake signer for tests.
//!
//! Simulated network boundary with configurable results and failure
//! injection. Every call is recorded with a timestamp so tests can assert
//! ordering and the settling delay between dispatches.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::time::Instant;

use super::{ActionResult, Gateway, SpawnRequest};
use crate::tags::Tag;
use crate::types::{Error, MessageId, ProcessId, Result};
use crate::wallet::Signer;

/// One recorded gateway interaction.
#[derive(Debug, Clone)]
pub enum GatewayCall {
    Spawn {
        module: String,
        scheduler: String,
        tags: Vec<Tag>,
        data: String,
        at: Instant,
    },
    Message {
        target: ProcessId,
        tags: Vec<Tag>,
        data: Option<String>,
        at: Instant,
    },
    DryRun {
        target: ProcessId,
        tags: Vec<Tag>,
        data: Option<String>,
        at: Instant,
    },
}

/// In-memory gateway that records calls instead of reaching the network.
#[derive(Debug)]
pub struct RecordingGateway {
    calls: Mutex<Vec<GatewayCall>>,
    message_counter: AtomicU64,
    spawn_id: String,
    spawn_error: Option<String>,
    message_error: Option<String>,
    message_result: ActionResult,
    dry_run_result: ActionResult,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            message_counter: AtomicU64::new(0),
            spawn_id: "spawned-process-0000000000000000000000000000".to_string(),
            spawn_error: None,
            message_error: None,
            message_result: ActionResult::default(),
            dry_run_result: ActionResult::default(),
        }
    }

    pub fn with_spawn_id(mut self, id: impl Into<String>) -> Self {
        self.spawn_id = id.into();
        self
    }

    pub fn with_spawn_error(mut self, message: impl Into<String>) -> Self {
        self.spawn_error = Some(message.into());
        self
    }

    pub fn with_message_error(mut self, message: impl Into<String>) -> Self {
        self.message_error = Some(message.into());
        self
    }

    pub fn with_message_result(mut self, result: ActionResult) -> Self {
        self.message_result = result;
        self
    }

    pub fn with_dry_run_result(mut self, result: ActionResult) -> Self {
        self.dry_run_result = result;
        self
    }

    /// Snapshot of all recorded calls, in order.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().expect("gateway call log poisoned").clone()
    }

    /// Number of committed message submissions recorded.
    pub fn message_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, GatewayCall::Message { .. }))
            .count()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().expect("gateway call log poisoned").push(call);
    }
}

impl Default for RecordingGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Gateway for RecordingGateway {
    async fn spawn(&self, request: SpawnRequest<'_>, _signer: &dyn Signer) -> Result<ProcessId> {
        self.record(GatewayCall::Spawn {
            module: request.module.as_str().to_string(),
            scheduler: request.scheduler.to_string(),
            tags: request.tags.to_vec(),
            data: request.data.to_string(),
            at: Instant::now(),
        });
        if let Some(message) = &self.spawn_error {
            return Err(Error::transport(message.clone()));
        }
        ProcessId::from_string(self.spawn_id.clone()).map_err(Error::transport)
    }

    async fn message(
        &self,
        target: &ProcessId,
        tags: &[Tag],
        data: Option<&str>,
        _signer: &dyn Signer,
    ) -> Result<(MessageId, ActionResult)> {
        self.record(GatewayCall::Message {
            target: target.clone(),
            tags: tags.to_vec(),
            data: data.map(str::to_string),
            at: Instant::now(),
        });
        if let Some(message) = &self.message_error {
            return Err(Error::transport(message.clone()));
        }
        let n = self.message_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let id = MessageId::from_string(format!("message-{n}")).map_err(Error::transport)?;
        Ok((id, self.message_result.clone()))
    }

    async fn dry_run(
        &self,
        target: &ProcessId,
        tags: &[Tag],
        data: Option<&str>,
    ) -> Result<ActionResult> {
        self.record(GatewayCall::DryRun {
            target: target.clone(),
            tags: tags.to_vec(),
            data: data.map(str::to_string),
            at: Instant::now(),
        });
        Ok(self.dry_run_result.clone())
    }
}

/// Signer with a fixed owner key and an all-zero signature. Never touches
/// real key material.
#[derive(Debug)]
pub struct FakeSigner {
    owner: Vec<u8>,
}

impl FakeSigner {
    pub fn new() -> Self {
        Self {
            owner: vec![0u8; 512],
        }
    }
}

impl Default for FakeSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl Signer for FakeSigner {
    fn owner(&self) -> &[u8] {
        &self.owner
    }

    fn address(&self) -> &str {
        "fake-wallet-address"
    }

    fn sign(&self, _message: &[u8]) -> Result<Vec<u8>> {
        Ok(vec![0u8; 512])
    }
}
