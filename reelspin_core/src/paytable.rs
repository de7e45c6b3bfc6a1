use serde::{Deserialize, Serialize};

use reelspin_shared::{Notice, OutcomeKind};

use crate::symbols::{SpinResult, SymbolId, SymbolTable};

/// A pair pays one fifth (20%) of the three-of-a-kind value.
pub const MATCH_DIVISOR: u64 = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Jackpot { symbol: SymbolId, amount: u64 },
    Match { symbol: SymbolId, amount: u64 },
    NoWin,
}

impl Outcome {
    pub fn amount(&self) -> u64 {
        match self {
            Outcome::Jackpot { amount, .. } | Outcome::Match { amount, .. } => *amount,
            Outcome::NoWin => 0,
        }
    }

    pub fn symbol(&self) -> Option<SymbolId> {
        match self {
            Outcome::Jackpot { symbol, .. } | Outcome::Match { symbol, .. } => Some(*symbol),
            Outcome::NoWin => None,
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Jackpot { .. } => OutcomeKind::Jackpot,
            Outcome::Match { .. } => OutcomeKind::Match,
            Outcome::NoWin => OutcomeKind::NoWin,
        }
    }

    pub fn is_win(&self) -> bool {
        !matches!(self, Outcome::NoWin)
    }

    pub fn notice(&self) -> Notice {
        match self {
            Outcome::Jackpot { amount, .. } => Notice::jackpot(*amount),
            Outcome::Match { amount, .. } => Notice::matched(*amount),
            Outcome::NoWin => Notice::try_again(),
        }
    }
}

/// Pair payout: `floor(value * 0.2)`, exact in integers for every `u64`.
pub fn match_amount(value: u64) -> u64 {
    value / MATCH_DIVISOR
}

/// Scores a settled spin. Three equal symbols pay the full value, any pair
/// pays [`match_amount`] of the paired symbol.
pub fn evaluate(table: &SymbolTable, result: &SpinResult) -> Outcome {
    let [a, b, c] = result.symbols();
    if a == b && b == c {
        return Outcome::Jackpot {
            symbol: a,
            amount: table.value_of(a),
        };
    }
    // With no triple, at most one pair exists; `c` is the paired symbol
    // unless the pair is (a, b).
    let pair = if a == b {
        Some(a)
    } else if b == c || a == c {
        Some(c)
    } else {
        None
    };
    match pair {
        Some(symbol) => Outcome::Match {
            symbol,
            amount: match_amount(table.value_of(symbol)),
        },
        None => Outcome::NoWin,
    }
}
