//! Command surface for the team-maker bot: tokenization, dispatch, and
//! channel-text rendering around `teamify-core`.

pub mod command;
pub mod handler;
pub mod report;
pub mod stats;
