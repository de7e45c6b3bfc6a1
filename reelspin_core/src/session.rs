use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};

use reelspin_shared::SpinReport;

use crate::engine::{Credits, STARTING_CREDITS};
use crate::paytable::Outcome;
use crate::source::{SymbolSource, WeightedSource};
use crate::symbols::SpinResult;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SpinState {
    #[default]
    Idle,
    Spinning,
}

/// A finished spin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpinRecord {
    pub result: SpinResult,
    pub outcome: Outcome,
    pub stake: Credits,
    /// Credits after the payout.
    pub credits: Credits,
    pub nonce: Option<u64>,
}

impl SpinRecord {
    pub fn report(&self) -> SpinReport {
        SpinReport {
            ts: Utc::now(),
            reels: self.result.labels(),
            outcome: self.outcome.kind(),
            amount: self.outcome.amount(),
            stake: self.stake,
            credits: self.credits,
            nonce: self.nonce,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionStats {
    pub spins: u64,
    pub total_staked: Credits,
    pub total_paid: Credits,
}

/// Everything one player's machine owns: the credit ledger, the spin state
/// and the symbol source.
pub struct Session {
    pub(crate) credits: Credits,
    pub(crate) state: SpinState,
    pub(crate) source: Box<dyn SymbolSource>,
    pub(crate) stats: SessionStats,
    pub(crate) last: Option<SpinRecord>,
}

impl Session {
    pub fn new(credits: Credits, source: Box<dyn SymbolSource>) -> Self {
        Self {
            credits,
            state: SpinState::Idle,
            source,
            stats: SessionStats::default(),
            last: None,
        }
    }

    pub fn credits(&self) -> Credits {
        self.credits
    }

    pub fn set_credits(&mut self, credits: Credits) {
        self.credits = credits;
    }

    pub fn state(&self) -> SpinState {
        self.state
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn last_spin(&self) -> Option<&SpinRecord> {
        self.last.as_ref()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(STARTING_CREDITS, Box::new(WeightedSource::from_entropy()))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("credits", &self.credits)
            .field("state", &self.state)
            .field("stats", &self.stats)
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

/// Cloneable handle to a [`Session`]. The lock is only ever held for short
/// synchronous sections, never across an await point.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle(Arc<Mutex<Session>>);

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        Self(Arc::new(Mutex::new(session)))
    }

    pub fn credits(&self) -> Credits {
        self.0.lock().credits
    }

    pub fn set_credits(&self, credits: Credits) {
        self.0.lock().credits = credits;
    }

    pub fn state(&self) -> SpinState {
        self.0.lock().state
    }

    pub fn stats(&self) -> SessionStats {
        self.0.lock().stats
    }

    pub fn last_spin(&self) -> Option<SpinRecord> {
        self.0.lock().last
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Session> {
        self.0.lock()
    }
}

impl From<Session> for SessionHandle {
    fn from(session: Session) -> Self {
        Self::new(session)
    }
}
