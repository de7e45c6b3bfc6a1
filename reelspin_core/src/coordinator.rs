use futures_util::future::join_all;
use tracing::{debug, info, warn};

use reelspin_shared::Notice;

use crate::{
    animation::ReelTiming,
    engine::PayoutEngine,
    render::{CancelSignal, ReelHandle, ReelRenderer},
    session::{SessionHandle, SpinRecord, SpinState},
    symbols::SpinResult,
};

/// What a call to [`SpinCoordinator::spin`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinAttempt {
    Completed(SpinRecord),
    /// Another spin was already in flight.
    Ignored,
    /// Not enough credits for the stake.
    NoCredits,
}

impl SpinAttempt {
    pub fn record(&self) -> Option<&SpinRecord> {
        match self {
            SpinAttempt::Completed(record) => Some(record),
            _ => None,
        }
    }
}

/// Runs spins: guard, stake, draw, animate all reels, settle the payout.
pub struct SpinCoordinator<R> {
    engine: PayoutEngine,
    renderer: R,
    timing: ReelTiming,
}

impl<R: ReelRenderer> SpinCoordinator<R> {
    pub fn new(engine: PayoutEngine, renderer: R, timing: ReelTiming) -> Self {
        Self {
            engine,
            renderer,
            timing,
        }
    }

    pub fn engine(&self) -> &PayoutEngine {
        &self.engine
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn timing(&self) -> ReelTiming {
        self.timing
    }

    /// Plays one spin to completion. Dropping the future after the stake is
    /// taken still pays the drawn result and returns the session to idle.
    pub async fn spin(&self, session: &SessionHandle) -> SpinAttempt {
        self.spin_with_cancel(session, CancelSignal::never()).await
    }

    /// Like [`spin`](Self::spin), but `cancel` cuts the reel animations
    /// short. The drawn result is still evaluated and paid.
    pub async fn spin_with_cancel(&self, session: &SessionHandle, cancel: CancelSignal) -> SpinAttempt {
        let (result, credits, nonce) = {
            let mut s = session.lock();
            if s.state == SpinState::Spinning {
                debug!("spin already in flight, ignoring start");
                return SpinAttempt::Ignored;
            }
            let credits = match self.engine.apply_stake(s.credits) {
                Ok(credits) => credits,
                Err(err) => {
                    drop(s);
                    debug!(%err, "spin rejected");
                    self.renderer.notify(Notice::no_credits());
                    return SpinAttempt::NoCredits;
                }
            };
            s.state = SpinState::Spinning;
            s.credits = credits;
            s.stats.total_staked += self.engine.stake();
            let result = self.engine.draw_spin(s.source.as_mut());
            (result, credits, s.source.nonce())
        };

        // From here on the spin settles even if this future is dropped.
        let mut pending = PendingSpin {
            engine: &self.engine,
            renderer: &self.renderer,
            session,
            result,
            nonce,
            settled: false,
        };

        self.renderer.credits_changed(credits);
        self.renderer.notify(Notice::spinning());
        debug!(%result, ?nonce, "reels drawn");

        let reels = result.symbols().into_iter().enumerate().map(|(i, target)| {
            self.renderer
                .animate_reel(ReelHandle(i), target, self.timing.duration_for(i), cancel.clone())
        });
        join_all(reels).await;

        let record = pending.settle();
        SpinAttempt::Completed(record)
    }
}

/// A staked and drawn spin whose payout is still owed.
struct PendingSpin<'a, R: ReelRenderer> {
    engine: &'a PayoutEngine,
    renderer: &'a R,
    session: &'a SessionHandle,
    result: SpinResult,
    nonce: Option<u64>,
    settled: bool,
}

impl<R: ReelRenderer> PendingSpin<'_, R> {
    fn settle(&mut self) -> SpinRecord {
        self.settled = true;
        let outcome = self.engine.evaluate(&self.result);
        let record = {
            let mut s = self.session.lock();
            s.credits = self.engine.apply_payout(s.credits, &outcome);
            s.state = SpinState::Idle;
            s.stats.spins += 1;
            s.stats.total_paid = s.stats.total_paid.saturating_add(outcome.amount());
            let record = SpinRecord {
                result: self.result,
                outcome,
                stake: self.engine.stake(),
                credits: s.credits,
                nonce: self.nonce,
            };
            s.last = Some(record);
            record
        };

        self.renderer.credits_changed(record.credits);
        self.renderer.notify(outcome.notice());
        info!(
            reels = %self.result,
            amount = outcome.amount(),
            credits = record.credits,
            "spin settled"
        );
        record
    }
}

impl<R: ReelRenderer> Drop for PendingSpin<'_, R> {
    fn drop(&mut self) {
        if !self.settled {
            warn!(reels = %self.result, "spin dropped before the reels stopped, settling now");
            self.settle();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tokio::time::Instant;

    use super::*;
    use crate::engine::Credits;
    use crate::paytable::Outcome;
    use crate::session::Session;
    use crate::source::ScriptedSource;
    use crate::symbols::SymbolId;

    #[derive(Default)]
    struct Recorder {
        notices: Mutex<Vec<Notice>>,
        settled: Mutex<Vec<(ReelHandle, SymbolId, Duration)>>,
        credits: Mutex<Vec<Credits>>,
    }

    #[async_trait]
    impl ReelRenderer for Recorder {
        async fn animate_reel(
            &self,
            reel: ReelHandle,
            target: SymbolId,
            duration: Duration,
            mut cancel: CancelSignal,
        ) {
            let start = Instant::now();
            tokio::select! {
                _ = tokio::time::sleep(duration) => {}
                _ = cancel.cancelled() => {}
            }
            self.settled.lock().push((reel, target, start.elapsed()));
        }

        fn notify(&self, notice: Notice) {
            self.notices.lock().push(notice);
        }

        fn credits_changed(&self, credits: Credits) {
            self.credits.lock().push(credits);
        }
    }

    fn session(credits: Credits, script: &[SymbolId]) -> SessionHandle {
        let source = ScriptedSource::new(script.to_vec()).unwrap();
        SessionHandle::new(Session::new(credits, Box::new(source)))
    }

    fn coordinator() -> SpinCoordinator<Recorder> {
        SpinCoordinator::new(PayoutEngine::classic(), Recorder::default(), ReelTiming::flicker())
    }

    #[tokio::test(start_paused = true)]
    async fn reels_settle_left_to_right() {
        let coordinator = coordinator();
        let session = session(100, &[SymbolId::One, SymbolId::Four, SymbolId::Six]);
        let attempt = coordinator.spin(&session).await;

        let record = attempt.record().copied().unwrap();
        assert_eq!(record.outcome, Outcome::NoWin);
        assert_eq!(record.credits, 90);

        let settled = coordinator.renderer().settled.lock().clone();
        let order: Vec<usize> = settled.iter().map(|(reel, _, _)| reel.0).collect();
        assert_eq!(order, vec![0, 1, 2]);
        let targets: Vec<SymbolId> = settled.iter().map(|(_, s, _)| *s).collect();
        assert_eq!(targets, vec![SymbolId::One, SymbolId::Four, SymbolId::Six]);
        assert!(settled[2].2 >= Duration::from_millis(2000));

        let notices = coordinator.renderer().notices.lock().clone();
        assert_eq!(notices, vec![Notice::spinning(), Notice::try_again()]);
        assert_eq!(*coordinator.renderer().credits.lock(), vec![90, 90]);
        assert_eq!(session.state(), SpinState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_is_ignored() {
        let coordinator = coordinator();
        let session = session(100, &[SymbolId::Two]);
        let (first, second) = tokio::join!(coordinator.spin(&session), coordinator.spin(&session));

        assert!(matches!(first, SpinAttempt::Completed(_)));
        assert_eq!(second, SpinAttempt::Ignored);
        assert_eq!(coordinator.renderer().settled.lock().len(), 3);
        // 100 - 10 + 500
        assert_eq!(session.credits(), 590);
        assert_eq!(session.stats().total_staked, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_settles_immediately_and_still_pays() {
        let coordinator = coordinator();
        let session = session(100, &[SymbolId::Five, SymbolId::Five, SymbolId::Three]);
        let (handle, signal) = CancelSignal::pair();
        handle.cancel();

        let attempt = coordinator.spin_with_cancel(&session, signal).await;
        let record = attempt.record().copied().unwrap();
        assert_eq!(record.result, SpinResult::new(SymbolId::Five, SymbolId::Five, SymbolId::Three));
        assert_eq!(
            record.outcome,
            Outcome::Match {
                symbol: SymbolId::Five,
                amount: 10
            }
        );
        assert_eq!(session.credits(), 100);
        assert!(coordinator
            .renderer()
            .settled
            .lock()
            .iter()
            .all(|(_, _, elapsed)| elapsed.is_zero()));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_spin_still_settles() {
        let coordinator = coordinator();
        let session = session(100, &[SymbolId::Three]);

        let cut = tokio::time::timeout(Duration::from_millis(100), coordinator.spin(&session)).await;
        assert!(cut.is_err());
        assert_eq!(session.state(), SpinState::Idle);
        // 100 - 10 + 200
        assert_eq!(session.credits(), 290);
        assert_eq!(session.stats().spins, 1);
        assert_eq!(session.last_spin().map(|r| r.credits), Some(290));
        assert_eq!(
            coordinator.renderer().notices.lock().last(),
            Some(&Notice::jackpot(200))
        );

        let next = coordinator.spin(&session).await;
        assert!(matches!(next, SpinAttempt::Completed(_)));
        assert_eq!(session.credits(), 480);
    }

    #[tokio::test(start_paused = true)]
    async fn no_credits_leaves_session_idle() {
        let coordinator = coordinator();
        let session = session(9, &[SymbolId::One]);
        assert_eq!(coordinator.spin(&session).await, SpinAttempt::NoCredits);
        assert_eq!(session.credits(), 9);
        assert_eq!(session.state(), SpinState::Idle);
        assert!(coordinator.renderer().settled.lock().is_empty());
        assert_eq!(*coordinator.renderer().notices.lock(), vec![Notice::no_credits()]);
    }
}
