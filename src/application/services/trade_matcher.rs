//! Direct two-party trade matching within a group

use crate::domain::entities::{CardSet, Member};

pub const NO_TRADES: &str = "No trades available right now.";

/// Another member whose inventory complements the requester's
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeMatch {
    pub user_id: String,
    /// Cards the candidate has that the requester needs
    pub has: CardSet,
    /// Cards the candidate needs that the requester has
    pub needs: CardSet,
}

impl TradeMatch {
    pub fn describe(&self) -> String {
        let mut clauses = Vec::new();
        if !self.has.is_empty() {
            clauses.push(format!("has {}", self.has));
        }
        if !self.needs.is_empty() {
            clauses.push(format!("needs {}", self.needs));
        }
        format!("<@{}> {}", self.user_id, clauses.join(" and "))
    }
}

/// Scan `population` for members complementing `member`, keeping its order.
///
/// Runs in O(N x 18). Candidates outside the requester's group, the
/// requester itself, and candidates with nothing to show are skipped.
pub fn find_matches(member: &Member, population: &[Member]) -> Vec<TradeMatch> {
    if member.is_idle() {
        return Vec::new();
    }

    population
        .iter()
        .filter(|c| c.group_id == member.group_id && c.user_id != member.user_id)
        .filter_map(|candidate| {
            let has = candidate.have.intersection(&member.need);
            let needs = candidate.need.intersection(&member.have);
            if has.is_empty() && needs.is_empty() {
                None
            } else {
                Some(TradeMatch {
                    user_id: candidate.user_id.clone(),
                    has,
                    needs,
                })
            }
        })
        .collect()
}

pub fn format_matches(matches: &[TradeMatch]) -> String {
    if matches.is_empty() {
        return NO_TRADES.to_string();
    }

    let lines: Vec<String> = matches.iter().map(|m| format!("• {}", m.describe())).collect();
    format!("Possible trades:\n{}", lines.join("\n"))
}
