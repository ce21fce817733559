//! The mention-triggered command grammar.
//!
//! Messages arrive as a bot mention followed by free-form tokens. The
//! grammar is deliberately forgiving: chart arguments can appear in any
//! order because each token's *shape* decides what it means (`week` is
//! a period, `artist` is a kind, `5x5` is a size).

use ostinato_core::model::{ChartRequest, GridSize, ItemKind, Period};

/// A parsed bot command, decoupled from Discord so the grammar can be
/// tested as plain functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Bare mention: show what the user is listening to right now.
    NowPlaying,
    /// `help`
    Help,
    /// `set username <name>`
    SetUsername(String),
    /// `chart [period] [kind] [WxH]`, validated.
    Chart(ChartRequest),
    /// A recognized command with arguments we must reject. Carries the
    /// user-facing explanation.
    Invalid(String),
    /// An unrecognized first token.
    Unknown(String),
}

/// Remove Discord mention tokens (`<@id>` / `<@!id>`) from a message.
///
/// The bot is addressed by mention, so the mention itself is never part
/// of the command.
#[must_use]
pub fn strip_mentions(content: &str) -> String {
    content
        .split_whitespace()
        .filter(|token| !(token.starts_with("<@") && token.ends_with('>')))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a mention-stripped message into a command.
#[must_use]
pub fn parse(content: &str) -> Command {
    let tokens: Vec<&str> = content.split_whitespace().collect();

    match tokens.first() {
        None => Command::NowPlaying,
        Some(&"help") => Command::Help,
        Some(&"set") => parse_set(&tokens[1..]),
        Some(&"chart") => parse_chart(&tokens[1..]),
        Some(other) => Command::Unknown((*other).to_string()),
    }
}

fn parse_set(args: &[&str]) -> Command {
    match args {
        ["username", name] => Command::SetUsername((*name).to_string()),
        _ => Command::Invalid(
            "to link your Last.fm account, use `set username <your-lastfm-name>`".to_string(),
        ),
    }
}

/// Build a chart request from order-independent tokens.
///
/// Each token is classified by shape: a known period word, a known item
/// kind, or something that looks like a `WxH` size. Anything that fits
/// no shape, a size that fails validation, or the same category given
/// twice rejects the whole command before any fetching happens.
fn parse_chart(args: &[&str]) -> Command {
    let mut period: Option<Period> = None;
    let mut kind: Option<ItemKind> = None;
    let mut grid: Option<GridSize> = None;

    for token in args {
        if let Some(p) = Period::parse(token) {
            if period.replace(p).is_some() {
                return Command::Invalid(format!("you gave more than one time period ({token})"));
            }
        } else if let Some(k) = ItemKind::parse(token) {
            if kind.replace(k).is_some() {
                return Command::Invalid(format!("you gave more than one chart type ({token})"));
            }
        } else if GridSize::looks_like_size(token) {
            match GridSize::parse(token) {
                Ok(g) => {
                    if grid.replace(g).is_some() {
                        return Command::Invalid(format!(
                            "you gave more than one chart size ({token})"
                        ));
                    }
                }
                Err(e) => return Command::Invalid(e.to_string()),
            }
        } else {
            return Command::Invalid(format!(
                "I don't understand `{token}` — chart arguments are a period \
                 (week/month/year/all), a type (album/artist/track), and a size like 3x3"
            ));
        }
    }

    Command::Chart(ChartRequest {
        kind: kind.unwrap_or(ItemKind::Album),
        grid: grid.unwrap_or_default(),
        period: period.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ostinato_core::model::MAX_GRID_EDGE;

    #[test]
    fn test_bare_mention_is_now_playing() {
        assert_eq!(parse(""), Command::NowPlaying);
        assert_eq!(parse("   "), Command::NowPlaying);
    }

    #[test]
    fn test_help() {
        assert_eq!(parse("help"), Command::Help);
    }

    #[test]
    fn test_set_username() {
        assert_eq!(
            parse("set username rj"),
            Command::SetUsername("rj".to_string())
        );
    }

    #[test]
    fn test_set_without_name_is_invalid() {
        assert!(matches!(parse("set username"), Command::Invalid(_)));
        assert!(matches!(parse("set"), Command::Invalid(_)));
    }

    #[test]
    fn test_chart_defaults() {
        let Command::Chart(req) = parse("chart") else {
            panic!("expected a chart command");
        };
        assert_eq!(req, ChartRequest::default());
        assert_eq!(req.period, Period::Week);
        assert_eq!(req.kind, ItemKind::Album);
        assert_eq!(req.grid.edge(), 3);
    }

    #[test]
    fn test_chart_tokens_are_order_independent() {
        let forward = parse("chart month artist 5x5");
        let backward = parse("chart 5x5 artist month");
        let shuffled = parse("chart artist 5x5 month");
        assert_eq!(forward, backward);
        assert_eq!(forward, shuffled);

        let Command::Chart(req) = forward else {
            panic!("expected a chart command");
        };
        assert_eq!(req.period, Period::Month);
        assert_eq!(req.kind, ItemKind::Artist);
        assert_eq!(req.grid.edge(), 5);
    }

    #[test]
    fn test_chart_partial_arguments_fill_defaults() {
        let Command::Chart(req) = parse("chart year") else {
            panic!("expected a chart command");
        };
        assert_eq!(req.period, Period::Year);
        assert_eq!(req.kind, ItemKind::Album);
        assert_eq!(req.grid.edge(), 3);
    }

    #[test]
    fn test_chart_rejects_mismatched_size() {
        let Command::Invalid(msg) = parse("chart 4x5") else {
            panic!("expected rejection");
        };
        assert!(msg.contains("square"));
    }

    #[test]
    fn test_chart_rejects_zero_size() {
        let Command::Invalid(msg) = parse("chart 0x0") else {
            panic!("expected rejection");
        };
        assert!(msg.contains("at least one cell"));
    }

    #[test]
    fn test_chart_rejects_oversized() {
        let Command::Invalid(msg) = parse("chart 11x11") else {
            panic!("expected rejection");
        };
        assert!(msg.contains(&format!("{MAX_GRID_EDGE}x{MAX_GRID_EDGE}")));
    }

    #[test]
    fn test_chart_rejects_duplicate_category() {
        assert!(matches!(parse("chart week month"), Command::Invalid(_)));
        assert!(matches!(parse("chart album track"), Command::Invalid(_)));
        assert!(matches!(parse("chart 3x3 4x4"), Command::Invalid(_)));
    }

    #[test]
    fn test_chart_rejects_stray_token() {
        let Command::Invalid(msg) = parse("chart biggest") else {
            panic!("expected rejection");
        };
        assert!(msg.contains("biggest"));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(parse("charts"), Command::Unknown("charts".to_string()));
    }

    #[test]
    fn test_strip_mentions() {
        assert_eq!(strip_mentions("<@1234> chart week"), "chart week");
        assert_eq!(strip_mentions("<@!1234> help"), "help");
        assert_eq!(strip_mentions("chart <@1234> week"), "chart week");
        assert_eq!(strip_mentions("<@1234>"), "");
    }
}
