use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;

use reelspin_core::{
    CancelSignal, Credits, PayoutEngine, ProvablyFairRng, ReelHandle, ReelRenderer, ReelTiming,
    ScriptedSource, Session, SessionHandle, SpinAttempt, SpinCoordinator, SpinState, SymbolId,
    SymbolTable, WeightedSource,
};
use reelspin_shared::{Notice, StyleHint};

#[derive(Default)]
struct Display {
    notices: Mutex<Vec<Notice>>,
    animated: Mutex<Vec<ReelHandle>>,
}

#[async_trait]
impl ReelRenderer for Display {
    async fn animate_reel(&self, reel: ReelHandle, _target: SymbolId, duration: Duration, _cancel: CancelSignal) {
        tokio::time::sleep(duration).await;
        self.animated.lock().push(reel);
    }

    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

fn machine() -> SpinCoordinator<Display> {
    SpinCoordinator::new(PayoutEngine::classic(), Display::default(), ReelTiming::rotor())
}

fn forced(credits: Credits, symbols: &[SymbolId]) -> SessionHandle {
    let source = ScriptedSource::new(symbols.to_vec()).unwrap();
    SessionHandle::new(Session::new(credits, Box::new(source)))
}

#[test]
fn rng_repeatable() {
    let table = SymbolTable::classic();
    let mut rng1 = ProvablyFairRng::new("s", "c", 42);
    let mut rng2 = ProvablyFairRng::new("s", "c", 42);
    for _ in 0..10 {
        assert_eq!(table.draw_weighted(&mut rng1), table.draw_weighted(&mut rng2));
    }
}

#[test]
fn rarest_symbol_frequency() {
    let engine = PayoutEngine::classic();
    let mut rng = StdRng::seed_from_u64(2024);
    let draws = 100_000;
    let hits = (0..draws)
        .filter(|_| engine.draw_weighted_symbol(&mut rng) == SymbolId::One)
        .count();
    let observed = hits as f64 / draws as f64;
    let expected = 2.0 / 112.0;
    // about 7 standard deviations
    assert!((observed - expected).abs() < 0.003, "observed {observed}");
}

#[test]
fn rtp_simulation_smoke() {
    let engine = PayoutEngine::classic();
    let report = engine.simulate(10_000, &mut WeightedSource::seeded(11));
    assert_eq!(report.total_staked, 100_000);
    // very loose bounds since the table is not balanced
    assert!(report.rtp > 0.0 && report.rtp < 10.0);
}

#[tokio::test(start_paused = true)]
async fn jackpot_end_to_end() {
    let machine = machine();
    let session = forced(100, &[SymbolId::Three, SymbolId::Three, SymbolId::Three]);

    let attempt = machine.spin(&session).await;

    let record = attempt.record().copied().unwrap();
    assert_eq!(record.outcome.amount(), 200);
    assert_eq!(session.credits(), 290);
    let last = machine.renderer().notices.lock().last().cloned().unwrap();
    assert_eq!(last.message, "JACKPOT! +200");
    assert_eq!(last.style, StyleHint::Jackpot);
}

#[tokio::test(start_paused = true)]
async fn no_credits_end_to_end() {
    let machine = machine();
    let session = forced(5, &[SymbolId::Three]);

    assert_eq!(machine.spin(&session).await, SpinAttempt::NoCredits);

    assert_eq!(session.credits(), 5);
    assert_eq!(session.state(), SpinState::Idle);
    let notices = machine.renderer().notices.lock().clone();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, "NO CREDITS!");
    assert!(machine.renderer().animated.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn plays_until_broke() {
    let machine = machine();
    let session = forced(30, &[SymbolId::One, SymbolId::Two, SymbolId::Four]);

    for expected in [20, 10, 0] {
        machine.spin(&session).await;
        assert_eq!(session.credits(), expected);
    }
    assert_eq!(machine.spin(&session).await, SpinAttempt::NoCredits);
    assert_eq!(session.stats().spins, 3);
    assert_eq!(machine.renderer().animated.lock().len(), 9);
}
