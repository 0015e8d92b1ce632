//! Message dispatch.
//!
//! One message, one dispatch. Simulate mode evaluates the message against
//! current process state without persisting anything; commit mode signs the
//! message and submits it for durable, ordered application. Simulate is the
//! default everywhere a caller does not state commit intent, so an
//! accidental invocation can never mutate network state.

use std::sync::Arc;

use crate::gateway::{ActionResult, Gateway};
use crate::tags::{self, Tag};
use crate::types::{MessageId, ProcessId, Result};
use crate::validation::validate_non_empty;
use crate::wallet::Signer;

/// How a message is applied.
#[derive(Debug, Clone, Copy)]
pub enum DispatchMode<'a> {
    /// Read-only projection of process state. No signature, no fees, no
    /// message id.
    Simulate,
    /// Signed, durably persisted write. The signer is required up front,
    /// before any network call.
    Commit(&'a dyn Signer),
}

/// Outcome of a dispatch.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    Simulated {
        result: ActionResult,
    },
    Committed {
        message_id: MessageId,
        result: ActionResult,
    },
}

impl DispatchOutcome {
    pub fn result(&self) -> &ActionResult {
        match self {
            Self::Simulated { result } | Self::Committed { result, .. } => result,
        }
    }

    /// The persisted message identifier. Absent for simulated outcomes.
    pub fn message_id(&self) -> Option<&MessageId> {
        match self {
            Self::Simulated { .. } => None,
            Self::Committed { message_id, .. } => Some(message_id),
        }
    }
}

/// Sends tagged messages to processes through a gateway.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    gateway: Arc<dyn Gateway>,
}

impl Dispatcher {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Dispatch one message.
    ///
    /// The emitted tag sequence places `Action` first, then caller tags in
    /// their given order. Tag names are not deduplicated.
    pub async fn dispatch(
        &self,
        target: &ProcessId,
        action: &str,
        extra_tags: &[Tag],
        data: Option<&str>,
        mode: DispatchMode<'_>,
    ) -> Result<DispatchOutcome> {
        validate_non_empty(action, "action")?;
        let tags = tags::with_action(action, extra_tags);
        match mode {
            DispatchMode::Simulate => {
                let result = self.gateway.dry_run(target, &tags, data).await?;
                Ok(DispatchOutcome::Simulated { result })
            }
            DispatchMode::Commit(signer) => {
                let (message_id, result) =
                    self.gateway.message(target, &tags, data, signer).await?;
                Ok(DispatchOutcome::Committed { message_id, result })
            }
        }
    }
}
