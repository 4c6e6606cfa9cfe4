//! Channel text rendering for session results.

use teamify_core::mover::MoveOutcome;
use teamify_core::session::{GatherReport, SessionReport};

/// Team listing posted after every successful partition.
pub fn render_teams(report: &SessionReport, source_channel: &str) -> String {
    let mut out = format!("Random teams from #{source_channel}:\n\n");
    for team in &report.teams {
        out.push_str(&format!("**{}:** {}\n", team.name, team.members.join(", ")));
    }
    out
}

/// One-line move summary, distinguishing "computed but not moved" from a
/// full or partial relocation, plus a line per provisioning error and per
/// failed move. No failure goes unmentioned.
pub fn render_summary(report: &SessionReport, outcomes: &[MoveOutcome]) -> String {
    let mut out = if report.relocated() {
        format!("Moved {} of {} participant(s).", report.moved, report.attempted)
    } else {
        "Teams posted. Nobody was moved.".to_string()
    };
    for error in &report.channel_creation_errors {
        out.push_str(&format!("\n⚠ {error}"));
    }
    for outcome in outcomes.iter().filter(|o| !o.result.is_moved()) {
        out.push_str(&format!(
            "\n⚠ could not move {}: {}",
            outcome.participant.display_name, outcome.result
        ));
    }
    out
}

pub fn render_gather(report: &GatherReport) -> String {
    let mut out = format!("Gathered {} of {} participant(s).", report.moved, report.attempted);
    for error in &report.errors {
        out.push_str(&format!("\n⚠ {error}"));
    }
    out
}

pub fn teamify_help(prefix: &str) -> String {
    [
        format!("**{prefix}teamify** — split the source voice channel into random teams:"),
        format!("`{prefix}teamify` — auto-split into teams of up to 4"),
        format!("`{prefix}teamify <count>` — split into a specific number of teams"),
        format!("`{prefix}teamify move` — split and move everyone into temporary squad channels"),
        format!("`{prefix}teamify <count> move` — both"),
        format!("`{prefix}moveall` — gather everyone back into the source channel"),
    ]
    .join("\n")
}

pub fn whoisbest_help(prefix: &str) -> String {
    [
        format!("**{prefix}whoisbest [category] [min_matches]** — top players by win% and AHD"),
        "`category` — stats category, case-insensitive (default: Casual)".to_string(),
        "`min_matches` — minimum matches played (default: 18)".to_string(),
        format!("Example: `{prefix}whoisbest Ranked 10`"),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use teamify_core::session::{SessionReport, TeamReport};

    use super::*;

    fn report(moved: usize, attempted: usize, errors: Vec<String>) -> SessionReport {
        SessionReport {
            teams: vec![TeamReport {
                name: "Team 1".to_string(),
                members: vec!["alice".to_string(), "bob".to_string()],
            }],
            moved,
            attempted,
            channel_creation_errors: errors,
        }
    }

    #[test]
    fn summary_distinguishes_unmoved_from_partial() {
        assert!(render_summary(&report(0, 0, vec![]), &[]).contains("Nobody was moved"));
        assert!(render_summary(&report(3, 4, vec![]), &[]).contains("Moved 3 of 4"));
    }

    #[test]
    fn errors_always_surface() {
        let text = render_summary(
            &report(0, 0, vec!["container 'x': missing permission".into()]),
            &[],
        );
        assert!(text.contains("missing permission"));
    }

    #[test]
    fn team_listing_names_every_member() {
        let text = render_teams(&report(0, 0, vec![]), "teamify");
        assert!(text.contains("**Team 1:** alice, bob"));
    }
}
