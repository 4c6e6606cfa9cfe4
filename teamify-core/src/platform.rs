//! Capability boundary to the chat platform.
//!
//! The lifecycle subsystem never talks to a gateway directly; everything it
//! needs from the platform is expressed here as a small async trait. One
//! `Platform` value is scoped to one guild/server, so methods take no
//! explicit scope argument.

use chrono::{DateTime, Utc};

/// Opaque reference to a platform user. Referenced, never owned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Participant {
    /// Stable platform identity.
    pub id: String,
    /// Display label used in reports and logs.
    pub display_name: String,
}

impl Participant {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Channel kinds we distinguish. Checked once at the boundary — everything
/// past `find_channel` carries its kind in the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Voice,
    Text,
    Category,
}

/// Reference to a platform channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelHandle {
    pub id: String,
    pub name: String,
    pub kind: ChannelKind,
    /// Grouping container holding this channel, if any.
    pub parent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A grouping container (category) holding ephemeral channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub id: String,
    pub name: String,
}

/// Classified failure from a platform call.
///
/// `NotFound` covers the benign races — a participant or channel vanishing
/// between scheduling and execution — and is never treated as an internal
/// error by callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    #[error("missing permission")]
    PermissionDenied,
    #[error("no longer exists")]
    NotFound,
    #[error("platform unavailable: {0}")]
    Unavailable(String),
}

/// The capability set required from the platform layer.
#[async_trait::async_trait]
pub trait Platform: Send + Sync {
    /// Current occupants of a voice channel.
    async fn list_members(&self, channel: &ChannelHandle)
        -> Result<Vec<Participant>, PlatformError>;

    /// Look up a channel by name and kind.
    async fn find_channel(
        &self,
        name: &str,
        kind: ChannelKind,
    ) -> Result<Option<ChannelHandle>, PlatformError>;

    /// All channels of the given kind.
    async fn list_channels(&self, kind: ChannelKind)
        -> Result<Vec<ChannelHandle>, PlatformError>;

    async fn create_container(&self, name: &str) -> Result<Container, PlatformError>;

    async fn create_voice_channel(
        &self,
        container: &Container,
        name: &str,
    ) -> Result<ChannelHandle, PlatformError>;

    async fn delete_channel(&self, channel: &ChannelHandle) -> Result<(), PlatformError>;

    async fn move_participant(
        &self,
        participant: &Participant,
        target: &ChannelHandle,
    ) -> Result<(), PlatformError>;

    async fn send_message(
        &self,
        channel: &ChannelHandle,
        text: &str,
    ) -> Result<(), PlatformError>;
}
