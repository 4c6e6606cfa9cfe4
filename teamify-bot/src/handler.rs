//! Dispatches parsed commands against the platform.
//!
//! The gateway layer (whatever delivers message lines) stays external; this
//! module takes an already-received line, runs the matching operation, and
//! posts the rendered result back to the report channel. Every invocation
//! answers with something — partial failure included.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinHandle;

use teamify_core::platform::{ChannelHandle, ChannelKind, Platform};
use teamify_core::session::{self, SessionConfig, SessionError, SessionRequest};
use teamify_core::sweeper::SweepSummary;

use crate::command::{self, Command};
use crate::report;
use crate::stats::{self, StatsFile};

/// Bot-level configuration around the core session config.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub prefix: String,
    /// Text channel the bot posts results into.
    pub report_channel: String,
    pub session: SessionConfig,
    /// Stats file for `whoisbest`; the command is disabled when absent.
    pub stats_file: Option<PathBuf>,
    pub default_stats_category: String,
    pub default_min_matches: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: "!".to_string(),
            report_channel: "teamify".to_string(),
            session: SessionConfig::default(),
            stats_file: None,
            default_stats_category: "Casual".to_string(),
            default_min_matches: 18,
        }
    }
}

/// Handle one message line.
///
/// Returns the sweeper handle when the invocation created channels, so the
/// caller can observe (or ignore) the background reclamation.
pub async fn handle_line<P>(
    platform: &Arc<P>,
    cfg: &BotConfig,
    line: &str,
) -> Result<Option<JoinHandle<SweepSummary>>>
where
    P: Platform + ?Sized + 'static,
{
    let Some(command) = command::parse(line, &cfg.prefix) else {
        return Ok(None);
    };

    match command {
        Command::Teamify { team_count, relocate } => {
            let request = SessionRequest { team_count, relocate };
            match session::run_session(platform, &cfg.session, request).await {
                Ok(outcome) => {
                    let text = format!(
                        "{}\n{}",
                        report::render_teams(&outcome.report, &cfg.session.source_channel),
                        report::render_summary(&outcome.report, &outcome.outcomes)
                    );
                    post(platform, cfg, &text).await?;
                    Ok(outcome.sweeper)
                }
                Err(e @ (SessionError::EmptyRoster(_) | SessionError::SourceChannelMissing(_))) => {
                    post(platform, cfg, &e.to_string()).await?;
                    Ok(None)
                }
                Err(SessionError::Platform(e)) => {
                    post(platform, cfg, &format!("Could not read the roster: {e}")).await?;
                    Ok(None)
                }
            }
        }

        Command::TeamifyHelp => {
            post(platform, cfg, &report::teamify_help(&cfg.prefix)).await?;
            Ok(None)
        }

        Command::MoveAll => {
            match session::run_gather(platform, &cfg.session).await {
                Ok(gather) if gather.attempted == 0 => {
                    post(platform, cfg, "Nobody to gather from other channels.").await?;
                }
                Ok(gather) => post(platform, cfg, &report::render_gather(&gather)).await?,
                Err(e) => post(platform, cfg, &e.to_string()).await?,
            }
            Ok(None)
        }

        Command::WhoIsBest { category, min_matches } => {
            let Some(path) = &cfg.stats_file else {
                post(platform, cfg, "No stats file configured.").await?;
                return Ok(None);
            };
            let text = match StatsFile::load(path) {
                Ok(file) => {
                    let category =
                        category.unwrap_or_else(|| cfg.default_stats_category.clone());
                    let min = min_matches.map(u64::from).unwrap_or(cfg.default_min_matches);
                    match file.leaderboard(&category, min) {
                        Some(board) => stats::render(&board),
                        None => format!(
                            "Unknown category '{category}'. Available: {}",
                            file.category_names().join(", ")
                        ),
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "stats lookup failed");
                    "Could not read the stats file.".to_string()
                }
            };
            post(platform, cfg, &text).await?;
            Ok(None)
        }

        Command::WhoIsBestHelp => {
            post(platform, cfg, &report::whoisbest_help(&cfg.prefix)).await?;
            Ok(None)
        }
    }
}

async fn report_channel<P: Platform + ?Sized>(
    platform: &P,
    cfg: &BotConfig,
) -> Result<Option<ChannelHandle>> {
    Ok(platform
        .find_channel(&cfg.report_channel, ChannelKind::Text)
        .await?)
}

async fn post<P: Platform + ?Sized>(platform: &Arc<P>, cfg: &BotConfig, text: &str) -> Result<()> {
    match report_channel(platform.as_ref(), cfg).await? {
        Some(channel) => {
            platform.send_message(&channel, text).await?;
        }
        None => {
            // Never fail the invocation over a missing report channel.
            tracing::warn!(channel = %cfg.report_channel, "report channel not found; dropping output");
            tracing::info!(%text, "undelivered report");
        }
    }
    Ok(())
}
