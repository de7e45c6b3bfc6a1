use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a front end should present a [`Notice`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StyleHint {
    Alert,
    Spinning,
    Jackpot,
    Match,
    Neutral,
}

impl StyleHint {
    /// Display color as a CSS-style hex string.
    pub fn color(self) -> &'static str {
        match self {
            StyleHint::Alert => "#ff0000",
            StyleHint::Spinning => "#ff00ff",
            StyleHint::Jackpot => "#ffff00",
            StyleHint::Match => "#00ffff",
            StyleHint::Neutral => "#ff00ff",
        }
    }
}

/// Transient status line pushed to the player.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub style: StyleHint,
}

impl Notice {
    pub fn new(message: impl Into<String>, style: StyleHint) -> Self {
        Self {
            message: message.into(),
            style,
        }
    }

    pub fn no_credits() -> Self {
        Self::new("NO CREDITS!", StyleHint::Alert)
    }

    pub fn spinning() -> Self {
        Self::new("SPINNING...", StyleHint::Spinning)
    }

    pub fn jackpot(amount: u64) -> Self {
        Self::new(format!("JACKPOT! +{amount}"), StyleHint::Jackpot)
    }

    pub fn matched(amount: u64) -> Self {
        Self::new(format!("MATCH! +{amount}"), StyleHint::Match)
    }

    pub fn try_again() -> Self {
        Self::new("TRY AGAIN", StyleHint::Neutral)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Jackpot,
    Match,
    NoWin,
}

/// One settled spin, as printed by the front ends.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpinReport {
    pub ts: DateTime<Utc>,
    pub reels: [char; 3],
    pub outcome: OutcomeKind,
    pub amount: u64,
    pub stake: u64,
    pub credits: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SymbolFrequency {
    pub symbol: char,
    pub draws: u64,
    pub share: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SimulationReport {
    pub ts: DateTime<Utc>,
    pub spins: u64,
    pub stake: u64,
    pub total_staked: u64,
    pub total_paid: u64,
    pub rtp: f64,
    pub jackpots: u64,
    pub matches: u64,
    pub no_wins: u64,
    pub symbols: Vec<SymbolFrequency>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VerifyReport {
    pub server_seed_hash: String,
    pub client_seed: String,
    pub nonce: u64,
    pub reels: [char; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches_expected: Option<bool>,
}
