//! Roster partitioning: uniform shuffle + round-robin into near-even teams.

use rand::seq::SliceRandom;

use crate::platform::Participant;

/// Target team size when no explicit team count is requested.
pub const DEFAULT_TEAM_SIZE: usize = 4;

/// An ordered group of participants assigned together. Immutable once
/// computed for a given invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    /// 1-based team number, used for display and channel naming.
    pub index: usize,
    pub members: Vec<Participant>,
}

/// Split a roster into teams.
///
/// The roster is shuffled with a fresh thread RNG (independent, unbiased
/// permutation per invocation) and dealt round-robin, so team sizes differ
/// by at most one and assignment is uniformly random given the sizes.
///
/// `requested` of `None` or `Some(0)` derives the count from
/// [`DEFAULT_TEAM_SIZE`]; anything else is clamped to `1..=roster.len()`.
/// Callers reject empty rosters before getting here; an empty roster yields
/// no teams.
pub fn partition(roster: &[Participant], requested: Option<usize>) -> Vec<Team> {
    if roster.is_empty() {
        return Vec::new();
    }

    let mut shuffled = roster.to_vec();
    shuffled.shuffle(&mut rand::thread_rng());

    let count = team_count(shuffled.len(), requested);
    let mut teams: Vec<Team> = (1..=count)
        .map(|index| Team { index, members: Vec::new() })
        .collect();
    for (i, member) in shuffled.into_iter().enumerate() {
        teams[i % count].members.push(member);
    }
    teams
}

fn team_count(roster_size: usize, requested: Option<usize>) -> usize {
    match requested {
        Some(n) if n > 0 => n.min(roster_size),
        _ => roster_size.div_ceil(DEFAULT_TEAM_SIZE),
    }
}
