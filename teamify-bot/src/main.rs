//! Local lifecycle simulator.
//!
//! Runs a teamify invocation against the in-memory platform: seeds a voice
//! channel with participants, executes the given command line, then drifts
//! participants out of their squad channels so the sweeper has something to
//! reclaim. Everything the bot would post to the report channel is echoed
//! to stdout.
//!
//! Usage:
//!   cargo run --bin teamify-bot -- --participants 10 --line '!teamify 3 move'
//!   cargo run --bin teamify-bot -- --line '!whoisbest Casual 10' --stats-file stats.json

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use teamify_bot::handler::{self, BotConfig};
use teamify_core::platform::{ChannelKind, Participant, Platform};
use teamify_core::session::SessionConfig;
use teamify_core::sim::SimPlatform;

#[derive(Parser)]
#[command(name = "teamify-bot", about = "Team-maker bot lifecycle simulator")]
struct Args {
    /// Participants seeded into the source voice channel
    #[arg(long, default_value_t = 10)]
    participants: usize,

    /// Command line to execute
    #[arg(long, default_value = "!teamify move")]
    line: String,

    /// Command prefix
    #[arg(long, default_value = "!")]
    prefix: String,

    /// Source voice channel name (also the report text channel)
    #[arg(long, default_value = "teamify")]
    channel: String,

    /// Sweep poll interval in seconds (short for demos; 60 in production)
    #[arg(long, default_value_t = 3)]
    sweep_interval_secs: u64,

    /// Seconds between simulated participants leaving their squad channel
    #[arg(long, default_value_t = 1)]
    drift_secs: u64,

    /// Stats file for !whoisbest
    #[arg(long, env = "TEAMIFY_STATS_FILE")]
    stats_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "teamify_core=info,teamify_bot=info".into()),
        )
        .init();

    let args = Args::parse();

    let sim = Arc::new(SimPlatform::new());
    sim.add_channel(&args.channel, ChannelKind::Text);
    let source = sim.add_channel(&args.channel, ChannelKind::Voice);
    for i in 1..=args.participants {
        sim.join(
            Participant::new(format!("u{i}"), format!("player-{i}")),
            &source.id,
        );
    }
    tracing::info!(
        participants = args.participants,
        channel = %args.channel,
        line = %args.line,
        "simulator ready"
    );

    let cfg = BotConfig {
        prefix: args.prefix.clone(),
        report_channel: args.channel.clone(),
        session: SessionConfig {
            source_channel: args.channel.clone(),
            sweep_interval: Duration::from_secs(args.sweep_interval_secs),
            ..SessionConfig::default()
        },
        stats_file: args.stats_file.clone(),
        ..BotConfig::default()
    };

    let sweeper = handler::handle_line(&sim, &cfg, &args.line).await?;

    for (_, text) in sim.sent_messages() {
        println!("{text}\n");
    }

    let Some(sweeper) = sweeper else {
        return Ok(());
    };

    // Drift participants out of their squad channels one by one, then let
    // the sweeper reclaim the emptied channels.
    let drift_sim = Arc::clone(&sim);
    let drift_source = source.id.clone();
    let drift = tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(args.drift_secs)).await;
            let squads = match drift_sim.list_channels(ChannelKind::Voice).await {
                Ok(channels) => channels,
                Err(_) => break,
            };
            let leaver = squads
                .iter()
                .filter(|c| c.id != drift_source)
                .flat_map(|c| drift_sim.occupants(&c.id))
                .next();
            match leaver {
                Some(id) => {
                    tracing::info!(participant = %id, "participant left their squad channel");
                    drift_sim.leave(&id);
                }
                None => break,
            }
        }
    });

    let summary = sweeper.await?;
    drift.abort();
    println!(
        "sweep finished: {} deleted, {} vanished, {} abandoned",
        summary.deleted, summary.vanished, summary.abandoned
    );

    Ok(())
}
