//! Grouping-container and squad-channel provisioning.

use crate::partition::Team;
use crate::platform::{ChannelHandle, ChannelKind, Container, Platform, PlatformError};

/// Look up the grouping container by name, creating it on miss.
///
/// Idempotent from the caller's perspective: calling it twice in sequence
/// returns the same container. Two invocations racing through the miss path
/// may still each create one — the platform is not assumed to serialize
/// create-if-absent, and no mutual exclusion is attempted here.
pub async fn ensure_container<P: Platform + ?Sized>(
    platform: &P,
    name: &str,
) -> Result<Container, PlatformError> {
    if let Some(existing) = platform.find_channel(name, ChannelKind::Category).await? {
        return Ok(Container { id: existing.id, name: existing.name });
    }
    tracing::info!(container = %name, "creating grouping container");
    platform.create_container(name).await
}

/// A channel-creation failure for one team. Provisioning continues past it.
#[derive(Debug, Clone)]
pub struct ProvisionFailure {
    pub team_index: usize,
    pub channel_name: String,
    pub error: PlatformError,
}

/// Channels created for one invocation, plus the failures that left teams
/// without one.
#[derive(Debug, Default)]
pub struct Provisioned {
    /// (team index, handle) for each team that got a channel. These handles
    /// become the sweeper's tracked set.
    pub channels: Vec<(usize, ChannelHandle)>,
    pub failures: Vec<ProvisionFailure>,
}

/// Channel name for a team, `"Squad <i>"`.
pub fn squad_channel_name(team_index: usize) -> String {
    format!("Squad {team_index}")
}

/// Create one ephemeral voice channel per team, sequentially.
///
/// Best effort: a denied or failed creation is recorded and later teams are
/// still attempted.
pub async fn provision_squad_channels<P: Platform + ?Sized>(
    platform: &P,
    container: &Container,
    teams: &[Team],
) -> Provisioned {
    let mut out = Provisioned::default();
    for team in teams {
        let name = squad_channel_name(team.index);
        match platform.create_voice_channel(container, &name).await {
            Ok(handle) => {
                tracing::info!(channel = %name, "created ephemeral voice channel");
                out.channels.push((team.index, handle));
            }
            Err(error) => {
                tracing::warn!(channel = %name, error = %error, "channel creation failed");
                out.failures.push(ProvisionFailure {
                    team_index: team.index,
                    channel_name: name,
                    error,
                });
            }
        }
    }
    out
}
