//! Dispatch outcome interpretation.
//!
//! Separates the three ways a dispatch can end: the transport failed, the
//! transport succeeded but the process's own handler reported an error, or
//! the process replied. What each one means for the exit status is the
//! caller's policy decision, not this module's.

use crate::dispatch::DispatchOutcome;
use crate::types::Error;

/// Classification of a dispatch attempt.
#[derive(Debug)]
pub enum Disposition {
    /// The process replied. Carries the first outbox message's data, or the
    /// raw result as pretty JSON when the outbox is empty.
    Success(String),

    /// The dispatch succeeded at the transport level but the process's
    /// handler rejected or failed the request.
    LogicalError(String),

    /// The dispatch itself failed: network unreachable, signing failure, or
    /// malformed response.
    TransportFailure(Error),
}

/// Classify a dispatch attempt.
pub fn classify(outcome: Result<DispatchOutcome, Error>) -> Disposition {
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(err) => return Disposition::TransportFailure(err),
    };

    let result = outcome.result();
    if let Some(error) = result.error_text() {
        return Disposition::LogicalError(error);
    }

    match result.first_message_data() {
        Some(data) => Disposition::Success(data),
        None => Disposition::Success(
            serde_json::to_string_pretty(result)
                .unwrap_or_else(|_| "<unprintable result>".to_string()),
        ),
    }
}
