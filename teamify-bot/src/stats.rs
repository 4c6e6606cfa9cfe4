//! Top-player lookup over the exported match-statistics file.
//!
//! The stats file is a JSON object mapping category names to arrays of
//! player entries. A simple filter + sort — no state machine. Numeric
//! fields tolerate strings with a comma decimal separator, which the
//! exporter sometimes emits.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStats {
    pub name: String,
    pub winratio: f64,
    /// Average human damage.
    pub ahd: f64,
    pub matches: u64,
}

/// Parsed stats file, keyed by category name as it appears on disk.
#[derive(Debug, Default)]
pub struct StatsFile {
    categories: HashMap<String, Vec<PlayerStats>>,
}

/// Top-3 lists for one category.
#[derive(Debug)]
pub struct Leaderboard {
    pub category: String,
    pub min_matches: u64,
    pub by_winratio: Vec<PlayerStats>,
    pub by_ahd: Vec<PlayerStats>,
}

impl StatsFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read stats file {}", path.display()))?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw).context("stats file is not valid JSON")?;
        let object = value
            .as_object()
            .context("stats file root must be an object of categories")?;

        let mut categories = HashMap::new();
        for (name, entries) in object {
            // Non-array members (export metadata etc.) are not categories.
            let Some(entries) = entries.as_array() else { continue };
            let players = entries
                .iter()
                .filter_map(|entry| {
                    let entry = entry.as_object()?;
                    Some(PlayerStats {
                        name: entry
                            .get("playername")
                            .and_then(Value::as_str)
                            .unwrap_or("unknown")
                            .to_string(),
                        winratio: flexible_float(entry.get("winratio")),
                        ahd: flexible_float(entry.get("ahd")),
                        matches: entry.get("matches").and_then(Value::as_u64).unwrap_or(0),
                    })
                })
                .collect();
            categories.insert(name.clone(), players);
        }
        Ok(Self { categories })
    }

    /// Category names as stored, for "available categories" messages.
    pub fn category_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.categories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Case-insensitive category resolution to the stored spelling.
    pub fn resolve_category(&self, requested: &str) -> Option<&str> {
        self.categories
            .keys()
            .find(|k| k.eq_ignore_ascii_case(requested))
            .map(String::as_str)
    }

    /// Top 3 by win ratio and by AHD among players with at least
    /// `min_matches` matches. `None` if the category does not exist.
    pub fn leaderboard(&self, category: &str, min_matches: u64) -> Option<Leaderboard> {
        let resolved = self.resolve_category(category)?;
        let eligible: Vec<&PlayerStats> = self.categories[resolved]
            .iter()
            .filter(|p| p.matches >= min_matches)
            .collect();

        let top = |key: fn(&PlayerStats) -> f64| -> Vec<PlayerStats> {
            let mut sorted = eligible.clone();
            sorted.sort_by(|a, b| key(b).total_cmp(&key(a)));
            sorted.into_iter().take(3).cloned().collect()
        };

        Some(Leaderboard {
            category: resolved.to_string(),
            min_matches,
            by_winratio: top(|p| p.winratio),
            by_ahd: top(|p| p.ahd),
        })
    }
}

/// Number, or string with either `.` or `,` as decimal separator; anything
/// else counts as 0.
fn flexible_float(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.replace(',', ".").parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

pub fn render(board: &Leaderboard) -> String {
    let mut out = format!(
        "📊 Top stats for '{}' (min {} matches)\n\n🏆 Top 3 win ratio\n",
        board.category, board.min_matches
    );
    push_ranking(&mut out, &board.by_winratio, |p| format!("{:.2}%", p.winratio));
    out.push_str("\n💥 Top 3 average human damage\n");
    push_ranking(&mut out, &board.by_ahd, |p| format!("{:.2}", p.ahd));
    out
}

fn push_ranking(out: &mut String, players: &[PlayerStats], fmt: impl Fn(&PlayerStats) -> String) {
    if players.is_empty() {
        out.push_str("(no data)\n");
        return;
    }
    for (i, player) in players.iter().enumerate() {
        out.push_str(&format!("{}. **{}** — {}\n", i + 1, player.name, fmt(player)));
    }
}
