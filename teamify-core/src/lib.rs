//! Ephemeral team/channel lifecycle.
//!
//! Given the occupants of a source voice channel, partition them into
//! balanced teams, provision short-lived squad channels, move everyone in
//! concurrently with per-participant failure isolation, and reclaim the
//! channels with a background sweep once they empty.
//!
//! Data flows one way: roster → teams → channels → move outcomes → report.
//! The sweeper runs orthogonally afterwards over the channels the invocation
//! created, and nothing persists across process restarts.

pub mod mover;
pub mod partition;
pub mod platform;
pub mod provision;
pub mod session;
pub mod sim;
pub mod sweeper;
