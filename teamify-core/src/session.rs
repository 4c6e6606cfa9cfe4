//! One user-issued partition request, end to end.
//!
//! Validates preconditions, partitions the roster, provisions squad channels,
//! fans out the moves, and hands the created channels to a fresh sweeper.
//! Every invocation yields a report, even under partial failure — only a
//! failed precondition (empty roster, missing source channel) aborts, and it
//! aborts before any side effect.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::mover::{self, MoveOutcome};
use crate::partition::{self, Team};
use crate::platform::{
    ChannelHandle, ChannelKind, Participant, Platform, PlatformError,
};
use crate::provision;
use crate::sweeper::{self, SweepSummary};

/// Well-known channel and container names, plus the sweep cadence.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Voice channel whose occupants form the roster.
    pub source_channel: String,
    /// Grouping container for the ephemeral squad channels.
    pub container_name: String,
    pub sweep_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            source_channel: "teamify".to_string(),
            container_name: "Temporary Teams".to_string(),
            sweep_interval: sweeper::SWEEP_INTERVAL,
        }
    }
}

/// What the user asked for.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionRequest {
    /// `None` or `Some(0)` derives the count from the default team size.
    pub team_count: Option<usize>,
    /// Whether to move participants into per-team channels.
    pub relocate: bool,
}

/// Precondition failures. Anything past these degrades instead of aborting.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("voice channel '{0}' not found")]
    SourceChannelMissing(String),
    #[error("nobody in '{0}' to partition")]
    EmptyRoster(String),
    /// Roster lookup itself failed; no side effect has happened yet.
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamReport {
    pub name: String,
    pub members: Vec<String>,
}

/// The structured result of one invocation.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub teams: Vec<TeamReport>,
    /// Successful relocations out of `attempted`.
    pub moved: usize,
    pub attempted: usize,
    /// Human-readable entries for container/channel provisioning failures.
    /// Individual failed moves live in the invocation's outcomes and logs.
    pub channel_creation_errors: Vec<String>,
}

impl SessionReport {
    /// True when relocation happened for at least one participant.
    pub fn relocated(&self) -> bool {
        self.attempted > 0
    }
}

/// Report plus the handles a caller may want to observe.
#[derive(Debug)]
pub struct SessionOutcome {
    pub report: SessionReport,
    pub teams: Vec<Team>,
    pub outcomes: Vec<MoveOutcome>,
    /// Running sweep over the channels this invocation created, if any.
    /// The coordinator does not await it.
    pub sweeper: Option<JoinHandle<SweepSummary>>,
}

/// Run one partition request.
pub async fn run_session<P>(
    platform: &Arc<P>,
    cfg: &SessionConfig,
    request: SessionRequest,
) -> Result<SessionOutcome, SessionError>
where
    P: Platform + ?Sized + 'static,
{
    let source = platform
        .find_channel(&cfg.source_channel, ChannelKind::Voice)
        .await?
        .ok_or_else(|| SessionError::SourceChannelMissing(cfg.source_channel.clone()))?;

    let roster = platform.list_members(&source).await?;
    if roster.is_empty() {
        return Err(SessionError::EmptyRoster(cfg.source_channel.clone()));
    }

    let teams = partition::partition(&roster, request.team_count);
    tracing::info!(
        roster = roster.len(),
        teams = teams.len(),
        relocate = request.relocate,
        "partitioned roster"
    );

    let mut channel_creation_errors = Vec::new();

    // Degrade to post-only when the container can't be ensured.
    let container = if request.relocate {
        match provision::ensure_container(platform.as_ref(), &cfg.container_name).await {
            Ok(container) => Some(container),
            Err(error) => {
                tracing::warn!(container = %cfg.container_name, error = %error, "container unavailable, posting teams without relocation");
                channel_creation_errors.push(format!(
                    "container '{}': {error}",
                    cfg.container_name
                ));
                None
            }
        }
    } else {
        None
    };

    // Sequential per-team channel creation; the move fan-out below is
    // batched across all teams at once.
    let mut tracked: Vec<ChannelHandle> = Vec::new();
    let mut assignments: Vec<(Participant, ChannelHandle)> = Vec::new();
    if let Some(container) = &container {
        let provisioned =
            provision::provision_squad_channels(platform.as_ref(), container, &teams).await;
        for failure in &provisioned.failures {
            channel_creation_errors
                .push(format!("{}: {}", failure.channel_name, failure.error));
        }
        for (team_index, handle) in provisioned.channels {
            let team = &teams[team_index - 1];
            for member in &team.members {
                assignments.push((member.clone(), handle.clone()));
            }
            tracked.push(handle);
        }
    }

    let outcomes = mover::move_all(platform.as_ref(), &assignments).await;
    let moved = outcomes.iter().filter(|o| o.result.is_moved()).count();

    let report = SessionReport {
        teams: teams
            .iter()
            .map(|team| TeamReport {
                name: format!("Team {}", team.index),
                members: team.members.iter().map(|m| m.display_name.clone()).collect(),
            })
            .collect(),
        moved,
        attempted: assignments.len(),
        channel_creation_errors,
    };

    let sweeper = if tracked.is_empty() {
        None
    } else {
        Some(sweeper::spawn(
            Arc::clone(platform),
            tracked,
            cfg.sweep_interval,
        ))
    };

    Ok(SessionOutcome { report, teams, outcomes, sweeper })
}

/// Result of gathering everyone back into the source channel.
#[derive(Debug, Clone, Serialize)]
pub struct GatherReport {
    pub moved: usize,
    pub attempted: usize,
    pub errors: Vec<String>,
}

/// Move every occupant of every other voice channel into the source channel.
pub async fn run_gather<P>(
    platform: &Arc<P>,
    cfg: &SessionConfig,
) -> Result<GatherReport, SessionError>
where
    P: Platform + ?Sized + 'static,
{
    let target = platform
        .find_channel(&cfg.source_channel, ChannelKind::Voice)
        .await?
        .ok_or_else(|| SessionError::SourceChannelMissing(cfg.source_channel.clone()))?;

    let mut assignments: Vec<(Participant, ChannelHandle)> = Vec::new();
    for channel in platform.list_channels(ChannelKind::Voice).await? {
        if channel.id == target.id {
            continue;
        }
        // A channel emptying or vanishing mid-enumeration is fine.
        match platform.list_members(&channel).await {
            Ok(members) => {
                for member in members {
                    assignments.push((member, target.clone()));
                }
            }
            Err(PlatformError::NotFound) => continue,
            Err(error) => {
                tracing::warn!(channel = %channel.name, error = %error, "skipping channel during gather");
            }
        }
    }

    let outcomes = mover::move_all(platform.as_ref(), &assignments).await;
    let moved = outcomes.iter().filter(|o| o.result.is_moved()).count();
    let errors = outcomes
        .iter()
        .filter(|o| !o.result.is_moved())
        .map(|o| format!("move {}: {}", o.participant.display_name, o.result))
        .collect();

    Ok(GatherReport { moved, attempted: assignments.len(), errors })
}
