use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use reelspin_shared::Notice;

use crate::engine::Credits;
use crate::symbols::SymbolId;

/// Index of a reel, 0 is the leftmost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReelHandle(pub usize);

impl fmt::Display for ReelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reel{}", self.0 + 1)
    }
}

/// Presentation side of the machine.
#[async_trait]
pub trait ReelRenderer: Send + Sync {
    /// Spin `reel` and settle it on `target` within `duration`. Returning is
    /// the completion signal. When `cancel` fires the reel should settle on
    /// `target` immediately and return.
    async fn animate_reel(
        &self,
        reel: ReelHandle,
        target: SymbolId,
        duration: Duration,
        cancel: CancelSignal,
    );

    /// Fire-and-forget status line.
    fn notify(&self, notice: Notice);

    fn credits_changed(&self, _credits: Credits) {}
}

/// Receiving side of a cancellation request.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

/// Sending side; dropping it without calling [`CancelHandle::cancel`] never
/// cancels anything.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelSignal {
    pub fn pair() -> (CancelHandle, CancelSignal) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle { tx }, CancelSignal { rx })
    }

    /// A signal that never fires.
    pub fn never() -> Self {
        Self::pair().1
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested; pends forever otherwise.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}
