pub mod animation;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod paytable;
pub mod render;
pub mod rng;
pub mod session;
pub mod source;
pub mod symbols;

pub use crate::animation::{ease_out_cubic, Drum, ReelTiming, RotorPlan};
pub use crate::config::GameConfig;
pub use crate::coordinator::{SpinAttempt, SpinCoordinator};
pub use crate::engine::{spin_with_seeds, verify_spin, Credits, PayoutEngine, DEFAULT_STAKE, STARTING_CREDITS};
pub use crate::error::{SlotError, SlotResult};
pub use crate::paytable::{evaluate, match_amount, Outcome};
pub use crate::render::{CancelHandle, CancelSignal, ReelHandle, ReelRenderer};
pub use crate::rng::{derive_hash_hex, ProvablyFairRng};
pub use crate::session::{Session, SessionHandle, SessionStats, SpinRecord, SpinState};
pub use crate::source::{ProvablyFairSource, ScriptedSource, SymbolSource, WeightedSource};
pub use crate::symbols::{SpinResult, SymbolId, SymbolSpec, SymbolTable, REEL_COUNT};
