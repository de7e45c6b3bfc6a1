use serde::{Deserialize, Serialize};

use crate::animation::ReelTiming;
use crate::engine::{Credits, PayoutEngine, DEFAULT_STAKE, STARTING_CREDITS};
use crate::symbols::SymbolTable;

/// Machine settings. Every field has a default so partial configs work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameConfig {
    pub starting_credits: Credits,
    pub stake: Credits,
    pub timing: ReelTiming,
    pub symbols: SymbolTable,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_credits: STARTING_CREDITS,
            stake: DEFAULT_STAKE,
            timing: ReelTiming::default(),
            symbols: SymbolTable::classic(),
        }
    }
}

impl GameConfig {
    pub fn engine(&self) -> PayoutEngine {
        PayoutEngine::new(self.symbols.clone(), self.stake)
    }
}
