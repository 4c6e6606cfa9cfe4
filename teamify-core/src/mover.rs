//! Concurrent relocation fan-out.
//!
//! Every move in a batch is issued at once and every outcome is collected;
//! one participant failing never cancels the others. Outcomes are correlated
//! back to participants by identity — completion order is meaningless.

use futures::future::join_all;

use crate::platform::{ChannelHandle, Participant, Platform, PlatformError};

/// Result of one relocation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveResult {
    Moved,
    /// The acting agent lacks move rights.
    PermissionDenied,
    /// Participant or channel vanished between scheduling and execution.
    /// A benign race, not an internal error.
    Gone,
    Failed(String),
}

impl MoveResult {
    pub fn is_moved(&self) -> bool {
        matches!(self, MoveResult::Moved)
    }
}

impl std::fmt::Display for MoveResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveResult::Moved => write!(f, "moved"),
            MoveResult::PermissionDenied => write!(f, "permission denied"),
            MoveResult::Gone => write!(f, "participant or channel gone"),
            MoveResult::Failed(msg) => write!(f, "failed: {msg}"),
        }
    }
}

/// Per-participant outcome of one relocation attempt.
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub participant: Participant,
    pub target: ChannelHandle,
    pub result: MoveResult,
}

/// Move every participant to their assigned channel, concurrently.
///
/// Returns only after all attempts have resolved; no outcome is dropped.
pub async fn move_all<P: Platform + ?Sized>(
    platform: &P,
    assignments: &[(Participant, ChannelHandle)],
) -> Vec<MoveOutcome> {
    let attempts = assignments.iter().map(|(participant, target)| async move {
        let result = match platform.move_participant(participant, target).await {
            Ok(()) => MoveResult::Moved,
            Err(PlatformError::PermissionDenied) => MoveResult::PermissionDenied,
            Err(PlatformError::NotFound) => MoveResult::Gone,
            Err(PlatformError::Unavailable(msg)) => MoveResult::Failed(msg),
        };
        if !result.is_moved() {
            tracing::warn!(
                participant = %participant.display_name,
                target = %target.name,
                outcome = ?result,
                "relocation failed"
            );
        }
        MoveOutcome {
            participant: participant.clone(),
            target: target.clone(),
            result,
        }
    });
    join_all(attempts).await
}
