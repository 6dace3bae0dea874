//! Command parser - Turns free chat text into a typed Command

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::domain::entities::Command;

/// Leading `<@U123>` mentions addressing the bot
static MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:<@[^>\s]+>\s*)+").unwrap());
static HELP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^help").unwrap());
static HAVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)^i have\b(.*)$").unwrap());
static NEED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)^i need\b(.*)$").unwrap());
static TRADED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)^i traded\b(.*)$").unwrap());
static SHOW_TRADES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^show trades").unwrap());

/// Parses incoming chat text into Command values.
///
/// Parsing is pure: the same text always yields the same Command.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandParser;

impl CommandParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse raw chat text. Case and surrounding whitespace are ignored.
    pub fn parse(&self, text: &str) -> Command {
        let lowered = text.trim().to_lowercase();
        let text = MENTION.replace(&lowered, "");
        let text = text.trim();

        if HELP.is_match(text) {
            return Command::Help;
        }

        if let Some(caps) = HAVE.captures(text) {
            return match parse_ids(&caps[1]) {
                Some(ids) => Command::MarkHave(ids),
                None => Command::Malformed { keyword: "i have" },
            };
        }

        if let Some(caps) = NEED.captures(text) {
            return match parse_ids(&caps[1]) {
                Some(ids) => Command::MarkNeed(ids),
                None => Command::Malformed { keyword: "i need" },
            };
        }

        if let Some(caps) = TRADED.captures(text) {
            return match parse_trade(&caps[1]) {
                Some((traded_out, traded_in)) => Command::RecordTrade { traded_out, traded_in },
                None => Command::Malformed { keyword: "i traded" },
            };
        }

        if SHOW_TRADES.is_match(text) {
            return Command::ShowTrades;
        }

        Command::Unrecognized
    }
}

/// Whitespace-separated integers; any bad token or an empty list fails the whole list
fn parse_ids(args: &str) -> Option<Vec<i64>> {
    let ids = args
        .split_whitespace()
        .map(|token| token.parse::<i64>().ok())
        .collect::<Option<Vec<_>>>()?;

    if ids.is_empty() {
        None
    } else {
        Some(ids)
    }
}

/// `<ids> for <ids>`, split on the first standalone `for` token
fn parse_trade(args: &str) -> Option<(Vec<i64>, Vec<i64>)> {
    let tokens: Vec<&str> = args.split_whitespace().collect();
    let split = tokens.iter().position(|t| *t == "for")?;

    let traded_out = parse_ids(&tokens[..split].join(" "))?;
    let traded_in = parse_ids(&tokens[split + 1..].join(" "))?;
    Some((traded_out, traded_in))
}
