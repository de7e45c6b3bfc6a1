use chrono::Utc;
use rand::Rng;

use reelspin_shared::{SimulationReport, SymbolFrequency};

use crate::{
    error::{SlotError, SlotResult},
    paytable::{self, Outcome},
    rng::ProvablyFairRng,
    source::SymbolSource,
    symbols::{SpinResult, SymbolId, SymbolTable, REEL_COUNT},
};

pub type Credits = u64;

pub const STARTING_CREDITS: Credits = 100;
pub const DEFAULT_STAKE: Credits = 10;

/// Symbol draws, scoring and the stake/payout arithmetic of the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutEngine {
    table: SymbolTable,
    stake: Credits,
}

impl PayoutEngine {
    pub fn new(table: SymbolTable, stake: Credits) -> Self {
        Self { table, stake }
    }

    pub fn classic() -> Self {
        Self::new(SymbolTable::classic(), DEFAULT_STAKE)
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    pub fn stake(&self) -> Credits {
        self.stake
    }

    pub fn draw_weighted_symbol<R: Rng + ?Sized>(&self, rng: &mut R) -> SymbolId {
        self.table.draw_weighted(rng)
    }

    /// Starts a new spin on `source` and draws reel 0, 1 and 2 in order.
    pub fn draw_spin(&self, source: &mut dyn SymbolSource) -> SpinResult {
        source.begin_spin();
        SpinResult(std::array::from_fn(|_| source.next_symbol(&self.table)))
    }

    pub fn evaluate(&self, result: &SpinResult) -> Outcome {
        paytable::evaluate(&self.table, result)
    }

    /// Takes the stake out of `credits`, or rejects without touching them.
    pub fn apply_stake(&self, credits: Credits) -> SlotResult<Credits> {
        credits
            .checked_sub(self.stake)
            .ok_or(SlotError::InsufficientCredits {
                credits,
                stake: self.stake,
            })
    }

    pub fn apply_payout(&self, credits: Credits, outcome: &Outcome) -> Credits {
        credits.saturating_add(outcome.amount())
    }

    /// Plays `spins` rounds with an unlimited bankroll and tallies the returns.
    pub fn simulate(&self, spins: u64, source: &mut dyn SymbolSource) -> SimulationReport {
        let mut total_paid: Credits = 0;
        let (mut jackpots, mut matches, mut no_wins) = (0u64, 0u64, 0u64);
        let mut draws = [0u64; SymbolId::ALL.len()];

        for _ in 0..spins {
            let result = self.draw_spin(source);
            for id in result.symbols() {
                draws[usize::from(id.to_index())] += 1;
            }
            let outcome = self.evaluate(&result);
            match outcome {
                Outcome::Jackpot { .. } => jackpots += 1,
                Outcome::Match { .. } => matches += 1,
                Outcome::NoWin => no_wins += 1,
            }
            total_paid = total_paid.saturating_add(outcome.amount());
        }

        let total_staked = spins * self.stake;
        let total_draws = spins * REEL_COUNT as u64;
        let symbols = self
            .table
            .ids()
            .map(|id| {
                let count = draws[usize::from(id.to_index())];
                SymbolFrequency {
                    symbol: id.label(),
                    draws: count,
                    share: ratio(count, total_draws),
                }
            })
            .collect();

        SimulationReport {
            ts: Utc::now(),
            spins,
            stake: self.stake,
            total_staked,
            total_paid,
            rtp: ratio(total_paid, total_staked),
            jackpots,
            matches,
            no_wins,
            symbols,
        }
    }
}

impl Default for PayoutEngine {
    fn default() -> Self {
        Self::classic()
    }
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Recomputes the reels of provably-fair spin `nonce`.
pub fn spin_with_seeds(server_seed: &str, client_seed: &str, nonce: u64, table: &SymbolTable) -> SpinResult {
    let mut rng = ProvablyFairRng::new(server_seed, client_seed, nonce);
    SpinResult(std::array::from_fn(|_| table.draw_weighted(&mut rng)))
}

/// Verify that a reported spin matches what the seeds produce.
pub fn verify_spin(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    table: &SymbolTable,
    expected: &SpinResult,
) -> bool {
    spin_with_seeds(server_seed, client_seed, nonce, table) == *expected
}
