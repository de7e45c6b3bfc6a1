//! Where reel symbols come from.
//!
//! A session owns one boxed [`SymbolSource`]. The coordinator calls
//! [`SymbolSource::begin_spin`] once per spin and then draws one symbol per
//! reel, reel 0 first.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::error::{SlotError, SlotResult};
use crate::rng::ProvablyFairRng;
use crate::symbols::{SymbolId, SymbolTable};

pub trait SymbolSource: Send {
    /// Called before the reels of a new spin are drawn.
    fn begin_spin(&mut self) {}

    fn next_symbol(&mut self, table: &SymbolTable) -> SymbolId;

    /// Provably-fair nonce of the spin in progress, if the source has one.
    fn nonce(&self) -> Option<u64> {
        None
    }
}

/// Weighted draws from any `rand` generator.
#[derive(Debug, Clone)]
pub struct WeightedSource<R> {
    rng: R,
}

impl<R: RngCore + Send> WeightedSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl WeightedSource<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore + Send> SymbolSource for WeightedSource<R> {
    fn next_symbol(&mut self, table: &SymbolTable) -> SymbolId {
        table.draw_weighted(&mut self.rng)
    }
}

/// One HMAC stream per spin; the nonce advances before every spin so spin
/// `n` can be recomputed from `(server_seed, client_seed, n)`.
#[derive(Debug, Clone)]
pub struct ProvablyFairSource {
    server_seed: String,
    client_seed: String,
    rng: ProvablyFairRng,
}

impl ProvablyFairSource {
    /// `last_nonce` is the nonce of the previous spin; the next spin uses
    /// `last_nonce + 1`.
    pub fn new(server_seed: impl Into<String>, client_seed: impl Into<String>, last_nonce: u64) -> Self {
        let server_seed = server_seed.into();
        let client_seed = client_seed.into();
        let rng = ProvablyFairRng::new(server_seed.clone(), client_seed.clone(), last_nonce);
        Self {
            server_seed,
            client_seed,
            rng,
        }
    }

    pub fn server_seed_hash_hex(&self) -> String {
        self.rng.server_seed_hash_hex()
    }
}

impl SymbolSource for ProvablyFairSource {
    fn begin_spin(&mut self) {
        let nonce = self.rng.nonce() + 1;
        self.rng = ProvablyFairRng::new(self.server_seed.clone(), self.client_seed.clone(), nonce);
    }

    fn next_symbol(&mut self, table: &SymbolTable) -> SymbolId {
        table.draw_weighted(&mut self.rng)
    }

    fn nonce(&self) -> Option<u64> {
        Some(self.rng.nonce())
    }
}

/// Replays a fixed list of symbols, cycling when it runs out. Used for demo
/// mode and for forcing outcomes in tests.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    script: Vec<SymbolId>,
    position: usize,
}

impl ScriptedSource {
    pub fn new(script: Vec<SymbolId>) -> SlotResult<Self> {
        if script.is_empty() {
            return Err(SlotError::EmptyScript);
        }
        Ok(Self {
            script,
            position: 0,
        })
    }
}

impl SymbolSource for ScriptedSource {
    fn next_symbol(&mut self, _table: &SymbolTable) -> SymbolId {
        let id = self.script[self.position % self.script.len()];
        self.position += 1;
        id
    }
}
