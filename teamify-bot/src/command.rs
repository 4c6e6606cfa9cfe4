//! Command-line tokenization for the bot's prefix commands.
//!
//! Arguments are loose: digits pick a team count, `move` requests
//! relocation, `help` wins over everything, and unrecognized tokens are
//! ignored.

/// A recognized invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Teamify { team_count: Option<usize>, relocate: bool },
    TeamifyHelp,
    /// Gather everyone back into the source voice channel.
    MoveAll,
    WhoIsBest { category: Option<String>, min_matches: Option<u32> },
    WhoIsBestHelp,
}

/// Parse one message line. Returns `None` for anything that is not a
/// command for this bot.
pub fn parse(line: &str, prefix: &str) -> Option<Command> {
    let rest = line.strip_prefix(prefix)?;
    let mut tokens = rest.split_whitespace();
    let name = tokens.next()?.to_lowercase();
    let args: Vec<&str> = tokens.collect();

    match name.as_str() {
        "teamify" => {
            if args.iter().any(|a| a.eq_ignore_ascii_case("help")) {
                return Some(Command::TeamifyHelp);
            }
            let mut team_count = None;
            let mut relocate = false;
            for arg in args {
                if let Ok(n) = arg.parse::<usize>() {
                    team_count = Some(n);
                } else if arg.eq_ignore_ascii_case("move") {
                    relocate = true;
                }
                // Anything else is ignored.
            }
            Some(Command::Teamify { team_count, relocate })
        }
        "moveall" => Some(Command::MoveAll),
        "whoisbest" => {
            if args.first().is_some_and(|a| a.eq_ignore_ascii_case("help")) {
                return Some(Command::WhoIsBestHelp);
            }
            let category = args.first().map(|s| s.to_string());
            let min_matches = args.get(1).and_then(|s| s.parse().ok());
            Some(Command::WhoIsBest { category, min_matches })
        }
        _ => None,
    }
}
