//! Inventory mutations applied to an in-memory Member.
//!
//! Every operation applies all valid ids before returning; ids outside
//! 1..=18 are skipped without error. Persisting the result is the
//! caller's job.

use crate::domain::entities::{CardSet, Member};

/// Cards actually cleared by `record_trade`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TradeRecord {
    pub given: CardSet,
    pub received: CardSet,
}

impl TradeRecord {
    pub fn is_empty(&self) -> bool {
        self.given.is_empty() && self.received.is_empty()
    }
}

/// Flag each valid id as owned. Returns the ids applied.
pub fn mark_have(member: &mut Member, cards: &[i64]) -> CardSet {
    let mut applied = CardSet::new();
    for &card in cards {
        if member.have.insert(card) {
            applied.insert(card);
        }
    }
    applied
}

/// Flag each valid id as wanted. Returns the ids applied.
pub fn mark_need(member: &mut Member, cards: &[i64]) -> CardSet {
    let mut applied = CardSet::new();
    for &card in cards {
        if member.need.insert(card) {
            applied.insert(card);
        }
    }
    applied
}

/// Clear `have` for cards given away and `need` for cards received.
/// The two lists do not interact.
pub fn record_trade(member: &mut Member, traded_out: &[i64], traded_in: &[i64]) -> TradeRecord {
    let mut record = TradeRecord::default();
    for &card in traded_out {
        if member.have.remove(card) {
            record.given.insert(card);
        }
    }
    for &card in traded_in {
        if member.need.remove(card) {
            record.received.insert(card);
        }
    }
    record
}

const NO_VALID_CARDS: &str = "None of those are card numbers I know. Cards are numbered 1-18.";

pub fn have_ack(applied: &CardSet) -> String {
    if applied.is_empty() {
        return NO_VALID_CARDS.to_string();
    }
    format!("Got it! You have cards {}.", applied)
}

pub fn need_ack(applied: &CardSet) -> String {
    if applied.is_empty() {
        return NO_VALID_CARDS.to_string();
    }
    format!("Got it! You need cards {}.", applied)
}

pub fn trade_ack(record: &TradeRecord) -> String {
    if record.is_empty() {
        return NO_VALID_CARDS.to_string();
    }

    let mut parts = Vec::new();
    if !record.given.is_empty() {
        parts.push(format!("you no longer have {}", record.given));
    }
    if !record.received.is_empty() {
        parts.push(format!("you no longer need {}", record.received));
    }
    format!("Trade recorded: {}.", parts.join(" and "))
}
