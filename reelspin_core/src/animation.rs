//! Reel timing and motion.
//!
//! Nothing here affects outcomes; it only decides how long each reel spins
//! and what it shows on the way.

use std::f64::consts::TAU;
use std::time::Duration;

use rand::seq::IteratorRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::symbols::{SymbolId, SymbolTable};

/// How often a flicker reel swaps its visible symbols.
pub const FLICKER_INTERVAL: Duration = Duration::from_millis(100);

/// Redraw period of the rotor reels.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub const FACES_PER_REEL: usize = 8;
pub const FULL_TURNS: u32 = 4;
pub const FACE_ANGLE: f64 = TAU / FACES_PER_REEL as f64;

/// Reel `i` spins for `base + i * stagger`, so the reels stop left to right.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReelTiming {
    pub base_ms: u64,
    pub stagger_ms: u64,
}

impl ReelTiming {
    pub const fn new(base_ms: u64, stagger_ms: u64) -> Self {
        Self {
            base_ms,
            stagger_ms,
        }
    }

    pub const fn flicker() -> Self {
        Self::new(1000, 500)
    }

    pub const fn rotor() -> Self {
        Self::new(1500, 500)
    }

    pub fn duration_for(&self, reel: usize) -> Duration {
        Duration::from_millis(self.base_ms + reel as u64 * self.stagger_ms)
    }
}

impl Default for ReelTiming {
    fn default() -> Self {
        Self::rotor()
    }
}

pub fn ease_out_cubic(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

/// Fraction of `total` covered by `elapsed`, clamped to `[0, 1]`. A zero
/// duration is already complete.
pub fn progress(elapsed: Duration, total: Duration) -> f64 {
    if total.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / total.as_secs_f64()).min(1.0)
}

/// Uniform pick used for the in-between frames of a flicker reel.
pub fn random_face<R: Rng + ?Sized>(table: &SymbolTable, rng: &mut R) -> SymbolId {
    table.ids().choose(rng).unwrap_or(SymbolId::One)
}

/// The printed strip around a rotor reel: table symbols repeated to fill
/// [`FACES_PER_REEL`] faces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drum {
    faces: Vec<SymbolId>,
}

impl Drum {
    pub fn new(table: &SymbolTable) -> Self {
        let ids: Vec<SymbolId> = table.ids().collect();
        let faces = (0..FACES_PER_REEL).map(|i| ids[i % ids.len()]).collect();
        Self { faces }
    }

    pub fn faces(&self) -> &[SymbolId] {
        &self.faces
    }

    /// First face printed with `id`; symbols missing from the strip use face 0.
    pub fn face_index(&self, id: SymbolId) -> usize {
        self.faces.iter().position(|f| *f == id).unwrap_or(0)
    }

    /// Rotation at which `id` faces the player.
    pub fn target_angle(&self, id: SymbolId) -> f64 {
        self.face_index(id) as f64 * FACE_ANGLE + FACE_ANGLE / 2.0
    }

    /// Symbol facing the player at `rotation`.
    pub fn face_at(&self, rotation: f64) -> SymbolId {
        let steps = ((rotation.rem_euclid(TAU) - FACE_ANGLE / 2.0) / FACE_ANGLE).round();
        let index = (steps as i64).rem_euclid(FACES_PER_REEL as i64) as usize;
        self.faces[index]
    }
}

/// One rotor spin: [`FULL_TURNS`] whole turns plus the forward distance to
/// the target face, eased out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotorPlan {
    start: f64,
    end: f64,
}

impl RotorPlan {
    pub fn new(drum: &Drum, start: f64, target: SymbolId) -> Self {
        let current = start.rem_euclid(TAU);
        let distance = (drum.target_angle(target) - current).rem_euclid(TAU);
        let end = start + TAU * f64::from(FULL_TURNS) + distance;
        Self { start, end }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn rotation_at(&self, progress: f64) -> f64 {
        self.start + (self.end - self.start) * ease_out_cubic(progress)
    }
}
