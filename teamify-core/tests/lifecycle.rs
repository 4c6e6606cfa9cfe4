//! Lifecycle tests over the in-memory platform.
//!
//! Covers the full invocation path (partition → provision → move → report →
//! sweep), partial-failure isolation, precondition aborts, and the sweeper
//! state machine under paused virtual time.

use std::sync::Arc;
use std::time::Duration;

use teamify_core::mover::MoveResult;
use teamify_core::partition::Team;
use teamify_core::platform::{ChannelKind, Participant, Platform};
use teamify_core::provision;
use teamify_core::session::{self, SessionConfig, SessionError, SessionRequest};
use teamify_core::sim::SimPlatform;
use teamify_core::sweeper::{self, SweepSummary};

fn setup(roster_size: usize) -> (Arc<SimPlatform>, SessionConfig) {
    let sim = SimPlatform::new();
    let source = sim.add_channel("teamify", ChannelKind::Voice);
    for i in 1..=roster_size {
        sim.join(
            Participant::new(format!("u{i}"), format!("player-{i}")),
            &source.id,
        );
    }
    let cfg = SessionConfig {
        sweep_interval: Duration::from_secs(60),
        ..SessionConfig::default()
    };
    (Arc::new(sim), cfg)
}

fn team_sizes(teams: &[Team]) -> Vec<usize> {
    let mut sizes: Vec<usize> = teams.iter().map(|t| t.members.len()).collect();
    sizes.sort_unstable();
    sizes.reverse();
    sizes
}

// ── Full session ───────────────────────────────────────────────────

#[tokio::test]
async fn session_moves_everyone_into_squad_channels() {
    let (sim, cfg) = setup(10);
    let request = SessionRequest { team_count: Some(3), relocate: true };

    let outcome = session::run_session(&sim, &cfg, request).await.unwrap();

    assert_eq!(team_sizes(&outcome.teams), vec![4, 3, 3]);
    assert_eq!(outcome.report.moved, 10);
    assert_eq!(outcome.report.attempted, 10);
    assert!(outcome.report.channel_creation_errors.is_empty());
    assert!(outcome.report.relocated());

    // Source plus three squads.
    assert_eq!(sim.voice_channel_count(), 4);
    for team in &outcome.teams {
        let squad = sim
            .find_channel(&format!("Squad {}", team.index), ChannelKind::Voice)
            .await
            .unwrap()
            .expect("squad channel exists");
        assert_eq!(sim.occupants(&squad.id).len(), team.members.len());
    }

    let sweeper = outcome.sweeper.expect("channels were created, sweep must run");
    sweeper.abort();
}

#[tokio::test]
async fn session_without_relocation_computes_teams_only() {
    let (sim, cfg) = setup(5);
    let request = SessionRequest { team_count: None, relocate: false };

    let outcome = session::run_session(&sim, &cfg, request).await.unwrap();

    // ceil(5/4) = 2 teams, sizes {3,2}.
    assert_eq!(team_sizes(&outcome.teams), vec![3, 2]);
    assert_eq!(outcome.report.attempted, 0);
    assert!(!outcome.report.relocated());
    assert!(outcome.sweeper.is_none());
    assert_eq!(sim.container_count(), 0);
    assert_eq!(sim.voice_channel_count(), 1);
}

#[tokio::test]
async fn empty_roster_aborts_before_any_side_effect() {
    let (sim, cfg) = setup(0);
    let request = SessionRequest { team_count: Some(2), relocate: true };

    let err = session::run_session(&sim, &cfg, request).await.unwrap_err();
    assert!(matches!(err, SessionError::EmptyRoster(_)));
    assert_eq!(sim.container_count(), 0);
    assert_eq!(sim.voice_channel_count(), 1);
}

#[tokio::test]
async fn missing_source_channel_aborts() {
    let sim = Arc::new(SimPlatform::new());
    let cfg = SessionConfig::default();

    let err = session::run_session(&sim, &cfg, SessionRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::SourceChannelMissing(_)));
}

// ── Partial failure ────────────────────────────────────────────────

#[tokio::test]
async fn one_denied_move_does_not_cancel_siblings() {
    let (sim, cfg) = setup(10);
    sim.deny_move("u4");
    let request = SessionRequest { team_count: Some(3), relocate: true };

    let outcome = session::run_session(&sim, &cfg, request).await.unwrap();

    assert_eq!(outcome.report.moved, 9);
    assert_eq!(outcome.report.attempted, 10);
    let denied: Vec<_> = outcome
        .outcomes
        .iter()
        .filter(|o| o.result == MoveResult::PermissionDenied)
        .collect();
    assert_eq!(denied.len(), 1);
    assert_eq!(denied[0].participant.id, "u4");
    assert!(outcome.report.channel_creation_errors.is_empty());
    outcome.sweeper.unwrap().abort();
}

#[tokio::test]
async fn participant_vanishing_mid_move_is_benign() {
    let (sim, cfg) = setup(6);
    sim.mark_gone("u2");
    let request = SessionRequest { team_count: Some(2), relocate: true };

    let outcome = session::run_session(&sim, &cfg, request).await.unwrap();

    assert_eq!(outcome.report.moved, 5);
    let gone: Vec<_> = outcome
        .outcomes
        .iter()
        .filter(|o| o.result == MoveResult::Gone)
        .collect();
    assert_eq!(gone.len(), 1);
    assert_eq!(gone[0].participant.id, "u2");
    outcome.sweeper.unwrap().abort();
}

#[tokio::test]
async fn denied_container_degrades_to_post_only() {
    let (sim, cfg) = setup(8);
    sim.deny_container_creation();
    let request = SessionRequest { team_count: Some(2), relocate: true };

    let outcome = session::run_session(&sim, &cfg, request).await.unwrap();

    // Teams still computed and reported; nothing moved, nothing created.
    assert_eq!(outcome.teams.len(), 2);
    assert_eq!(outcome.report.attempted, 0);
    assert_eq!(outcome.report.channel_creation_errors.len(), 1);
    assert!(outcome.sweeper.is_none());
    assert_eq!(sim.voice_channel_count(), 1);
}

#[tokio::test]
async fn failed_squad_channel_does_not_abort_later_teams() {
    let (sim, cfg) = setup(6);
    sim.deny_channel_creation("Squad 2");
    let request = SessionRequest { team_count: Some(3), relocate: true };

    let outcome = session::run_session(&sim, &cfg, request).await.unwrap();

    // Teams 1 and 3 (two members each) still relocate.
    assert_eq!(outcome.report.attempted, 4);
    assert_eq!(outcome.report.moved, 4);
    assert_eq!(outcome.report.channel_creation_errors.len(), 1);
    assert!(outcome.report.channel_creation_errors[0].contains("Squad 2"));
    assert_eq!(sim.voice_channel_count(), 3); // source + squads 1 and 3
    outcome.sweeper.unwrap().abort();
}

// ── Provisioning ───────────────────────────────────────────────────

#[tokio::test]
async fn ensure_container_is_idempotent() {
    let sim = SimPlatform::new();

    let first = provision::ensure_container(&sim, "Temporary Teams").await.unwrap();
    let second = provision::ensure_container(&sim, "Temporary Teams").await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(sim.container_count(), 1);
}

// ── Sweeper ────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn sweeper_reclaims_channels_as_they_empty() {
    let sim = Arc::new(SimPlatform::new());
    let a = sim.add_channel("Squad 1", ChannelKind::Voice);
    let b = sim.add_channel("Squad 2", ChannelKind::Voice);
    let c = sim.add_channel("Squad 3", ChannelKind::Voice);
    sim.join(Participant::new("u1", "player-1"), &c.id);

    let handle = sweeper::spawn(
        Arc::clone(&sim),
        vec![a.clone(), b.clone(), c.clone()],
        Duration::from_secs(60),
    );

    // Nothing happens before the first tick.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(sim.channel_exists(&a.id));

    // First poll: the two empty channels go, the occupied one stays.
    tokio::time::sleep(Duration::from_secs(31)).await;
    assert!(!sim.channel_exists(&a.id));
    assert!(!sim.channel_exists(&b.id));
    assert!(sim.channel_exists(&c.id));
    assert!(!handle.is_finished());

    // Occupant leaves; next poll reclaims the last channel and the task ends.
    sim.leave("u1");
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(!sim.channel_exists(&c.id));

    let summary = handle.await.unwrap();
    assert_eq!(summary, SweepSummary { deleted: 3, vanished: 0, abandoned: 0 });
}

#[tokio::test(start_paused = true)]
async fn sweeper_drops_channel_that_vanished_out_of_band() {
    let sim = Arc::new(SimPlatform::new());
    let a = sim.add_channel("Squad 1", ChannelKind::Voice);
    let b = sim.add_channel("Squad 2", ChannelKind::Voice);

    let handle = sweeper::spawn(
        Arc::clone(&sim),
        vec![a.clone(), b.clone()],
        Duration::from_secs(60),
    );

    sim.vanish_channel(&a.id);
    tokio::time::sleep(Duration::from_secs(61)).await;

    let summary = handle.await.unwrap();
    assert_eq!(summary.vanished, 1);
    assert_eq!(summary.deleted, 1);
}

#[tokio::test(start_paused = true)]
async fn sweeper_never_retries_a_denied_deletion() {
    let sim = Arc::new(SimPlatform::new());
    let a = sim.add_channel("Squad 1", ChannelKind::Voice);
    sim.deny_delete(&a.id);

    let handle = sweeper::spawn(Arc::clone(&sim), vec![a.clone()], Duration::from_secs(60));
    tokio::time::sleep(Duration::from_secs(61)).await;

    // Dropped from tracking — the task finished — but the channel remains.
    let summary = handle.await.unwrap();
    assert_eq!(summary.abandoned, 1);
    assert!(sim.channel_exists(&a.id));
}

#[tokio::test(start_paused = true)]
async fn occupied_channel_is_retained_indefinitely() {
    let sim = Arc::new(SimPlatform::new());
    let a = sim.add_channel("Squad 1", ChannelKind::Voice);
    sim.join(Participant::new("u1", "player-1"), &a.id);

    let handle = sweeper::spawn(Arc::clone(&sim), vec![a.clone()], Duration::from_secs(60));
    tokio::time::sleep(Duration::from_secs(60 * 60)).await;

    assert!(sim.channel_exists(&a.id));
    assert!(!handle.is_finished());
    handle.abort();
}

// ── Gather ─────────────────────────────────────────────────────────

#[tokio::test]
async fn gather_pulls_everyone_back_to_the_source() {
    let sim = Arc::new(SimPlatform::new());
    let source = sim.add_channel("teamify", ChannelKind::Voice);
    let other = sim.add_channel("Squad 1", ChannelKind::Voice);
    sim.join(Participant::new("u1", "player-1"), &other.id);
    sim.join(Participant::new("u2", "player-2"), &other.id);
    sim.join(Participant::new("u3", "player-3"), &source.id);

    let report = session::run_gather(&sim, &SessionConfig::default()).await.unwrap();

    assert_eq!(report.attempted, 2);
    assert_eq!(report.moved, 2);
    assert_eq!(sim.occupants(&source.id).len(), 3);
    assert!(sim.occupants(&other.id).is_empty());
}
