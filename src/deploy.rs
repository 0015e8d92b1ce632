//! Deployment workflow.
//!
//! Drives a fresh process through the ordered multi-phase handshake:
//! spawn → Eval → (optional settling delay) → Init. The sequence is modeled
//! as an explicit state machine so the window where the process exists but
//! has no executable behavior is a first-class, testable state.

use std::sync::Arc;

use chrono::Utc;
use tokio::time::sleep;

use crate::dispatch::{DispatchMode, DispatchOutcome, Dispatcher};
use crate::gateway::{Gateway, SpawnRequest};
use crate::interpret::{classify, Disposition};
use crate::tags::Tag;
use crate::types::{DeployConfig, Error, ProcessId, Result, DEFAULT_SPAWN_DATA};
use crate::wallet::Signer;

/// Deployment lifecycle state.
///
/// ```text
/// CREATED → SPAWNED → EVALUATED → INITIALIZED
///     │        │          │
///     └────────┴──────────┴──► FAILED
/// ```
///
/// `Spawned` is the eventual-consistency window of the underlying network:
/// the process is addressable the moment spawn returns, but behaves as an
/// empty process until the Eval message is accepted and applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeploymentState {
    Created,
    Spawned,
    Evaluated,
    Initialized,
    Failed,
}

impl DeploymentState {
    /// Check if transition is valid.
    pub fn can_transition_to(self, to: DeploymentState) -> bool {
        match (self, to) {
            (DeploymentState::Created, DeploymentState::Spawned) => true,
            (DeploymentState::Spawned, DeploymentState::Evaluated) => true,
            (DeploymentState::Evaluated, DeploymentState::Initialized) => true,
            // Any live state can fail.
            (DeploymentState::Created, DeploymentState::Failed) => true,
            (DeploymentState::Spawned, DeploymentState::Failed) => true,
            (DeploymentState::Evaluated, DeploymentState::Failed) => true,
            _ => false,
        }
    }
}

/// One deployment invocation: a state machine over the spawn/Eval/Init
/// handshake. Exactly one linear pass; nothing is retried.
#[derive(Debug)]
pub struct Deployment {
    gateway: Arc<dyn Gateway>,
    dispatcher: Dispatcher,
    config: DeployConfig,
    signer: Arc<dyn Signer>,
    state: DeploymentState,
    process_id: Option<ProcessId>,
}

impl Deployment {
    pub fn new(gateway: Arc<dyn Gateway>, config: DeployConfig, signer: Arc<dyn Signer>) -> Self {
        Self {
            dispatcher: Dispatcher::new(gateway.clone()),
            gateway,
            config,
            signer,
            state: DeploymentState::Created,
            process_id: None,
        }
    }

    pub fn state(&self) -> DeploymentState {
        self.state
    }

    /// The spawned process, once `spawn` has succeeded.
    pub fn process_id(&self) -> Option<&ProcessId> {
        self.process_id.as_ref()
    }

    /// Create the process identity. `Created → Spawned`.
    ///
    /// After this returns the process exists and is addressable, but any
    /// message sent before `evaluate` completes behaves as if sent to an
    /// empty process.
    pub async fn spawn(&mut self) -> Result<ProcessId> {
        self.ensure_state(DeploymentState::Created, "spawn")?;

        let tags = vec![
            Tag::new("App-Name", self.config.app_name.as_str()),
            Tag::new("Contract-Name", self.config.process_name.as_str()),
            Tag::new("Authority", self.config.authority.as_str()),
            Tag::new("Spawn-Timestamp", Utc::now().timestamp_millis().to_string()),
        ];
        let request = SpawnRequest {
            module: &self.config.module,
            scheduler: &self.config.scheduler,
            tags: &tags,
            data: DEFAULT_SPAWN_DATA,
        };

        match self.gateway.spawn(request, self.signer.as_ref()).await {
            Ok(process_id) => {
                self.transition(DeploymentState::Spawned)?;
                self.process_id = Some(process_id.clone());
                tracing::info!("Spawned AO process [{process_id}]");
                Ok(process_id)
            }
            Err(err) => self.fail(err),
        }
    }

    /// Load executable source into the process. `Spawned → Evaluated`.
    ///
    /// On failure the process exists but is non-functional; this is
    /// reported, not retried.
    pub async fn evaluate(&mut self, source: &str) -> Result<DispatchOutcome> {
        self.ensure_state(DeploymentState::Spawned, "evaluate")?;
        let process_id = self.current_process_id()?;

        tracing::info!(
            "Sending Action: Eval of [{}] to AO Process [{process_id}]",
            self.config.process_name
        );
        let tags = vec![Tag::new("App-Name", self.config.app_name.as_str())];
        let dispatched = self
            .dispatcher
            .dispatch(
                &process_id,
                "Eval",
                &tags,
                Some(source),
                DispatchMode::Commit(self.signer.as_ref()),
            )
            .await;

        match dispatched {
            Ok(outcome) => {
                self.transition(DeploymentState::Evaluated)?;
                Ok(outcome)
            }
            Err(err) => self.fail(err),
        }
    }

    /// Run the one-time Init handler. `Evaluated → Initialized`.
    ///
    /// Process readiness (scheduler assignment and state propagation) is not
    /// synchronously observable from the Eval response, so a fixed settling
    /// delay is enforced first. A populated `Error` in the Init result does
    /// not fail the transition: the dispatch itself succeeded.
    pub async fn initialize(&mut self) -> Result<DispatchOutcome> {
        let init = self
            .config
            .init
            .clone()
            .ok_or_else(|| Error::state("initialize called without init settings"))?;
        self.ensure_state(DeploymentState::Evaluated, "initialize")?;
        let process_id = self.current_process_id()?;

        tracing::info!(
            "Sleeping {}s to allow Eval action to settle",
            init.delay.as_secs_f64()
        );
        sleep(init.delay).await;

        tracing::info!("Initializing with Action: Init");
        let dispatched = self
            .dispatcher
            .dispatch(
                &process_id,
                "Init",
                &[],
                Some(&init.data),
                DispatchMode::Commit(self.signer.as_ref()),
            )
            .await;

        match dispatched {
            Ok(outcome) => {
                self.transition(DeploymentState::Initialized)?;
                Ok(outcome)
            }
            Err(err) => self.fail(err),
        }
    }

    /// Run the full handshake: spawn, Eval, then Init when configured.
    ///
    /// Init logical errors are logged as warnings and do NOT change the exit
    /// status — the deployment still reports complete. Transport failures
    /// anywhere remain fatal.
    pub async fn run(&mut self, source: &str) -> Result<ProcessId> {
        let process_id = self.spawn().await?;
        self.evaluate(source).await?;
        tracing::info!("Process published and evaluated at [{process_id}]");

        if self.config.init.is_some() {
            let outcome = self.initialize().await?;
            let message_id = outcome.message_id().cloned();
            match classify(Ok(outcome)) {
                Disposition::LogicalError(message) => {
                    tracing::warn!("Init Action resulted in an error: {message}");
                }
                _ => {
                    let id = message_id.map(|id| id.to_string()).unwrap_or_default();
                    tracing::info!("Init Action successful with message id {id}");
                }
            }
        } else {
            tracing::info!("CALL_INIT_HANDLER is not set to \"true\", skipping Init");
        }

        Ok(process_id)
    }

    fn current_process_id(&self) -> Result<ProcessId> {
        self.process_id
            .clone()
            .ok_or_else(|| Error::state("no process id recorded for this deployment"))
    }

    fn ensure_state(&self, expected: DeploymentState, operation: &str) -> Result<()> {
        if self.state != expected {
            return Err(Error::state(format!(
                "cannot {operation}: state is {:?}, expected {expected:?}",
                self.state
            )));
        }
        Ok(())
    }

    fn transition(&mut self, to: DeploymentState) -> Result<()> {
        if !self.state.can_transition_to(to) {
            return Err(Error::state(format!(
                "invalid transition {:?} -> {to:?}",
                self.state
            )));
        }
        self.state = to;
        Ok(())
    }

    fn fail<T>(&mut self, err: Error) -> Result<T> {
        self.state = DeploymentState::Failed;
        Err(err)
    }
}
