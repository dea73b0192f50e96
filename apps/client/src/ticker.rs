//! Cancellable timers for the quiz clock and delayed session events.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Repeating tick source. Stops when dropped.
///
/// Every tick carries the epoch it was started for, so a receiver can
/// discard ticks that were already queued when the ticker was replaced.
pub struct Ticker {
    epoch: u64,
    handle: JoinHandle<()>,
}

impl Ticker {
    pub fn spawn(epoch: u64, period: Duration, tx: UnboundedSender<u64>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(epoch).is_err() {
                    break;
                }
            }
        });
        Self { epoch, handle }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// One-shot events delivered after a delay, all cancellable at once.
pub struct DelayedEvents<T> {
    tx: UnboundedSender<T>,
    pending: Vec<JoinHandle<()>>,
}

impl<T: Send + 'static> DelayedEvents<T> {
    pub fn new(tx: UnboundedSender<T>) -> Self {
        Self {
            tx,
            pending: Vec::new(),
        }
    }

    pub fn schedule(&mut self, delay: Duration, event: T) {
        self.pending.retain(|h| !h.is_finished());
        let tx = self.tx.clone();
        self.pending.push(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the driver stopped
            let _ = tx.send(event);
        }));
    }

    /// Abort everything not yet delivered.
    pub fn cancel_all(&mut self) {
        for handle in self.pending.drain(..) {
            handle.abort();
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.iter().filter(|h| !h.is_finished()).count()
    }
}

impl<T> Drop for DelayedEvents<T> {
    fn drop(&mut self) {
        for handle in self.pending.drain(..) {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn drain<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> Vec<T> {
        let mut out = Vec::new();
        while let Ok(item) = rx.try_recv() {
            out.push(item);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_ticks_with_epoch() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let ticker = Ticker::spawn(7, Duration::from_millis(100), tx);
        assert_eq!(ticker.epoch(), 7);

        tokio::time::sleep(Duration::from_millis(1050)).await;
        let ticks = drain(&mut rx);
        assert!((9..=11).contains(&ticks.len()), "got {} ticks", ticks.len());
        assert!(ticks.iter().all(|e| *e == 7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_stops_on_drop() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let ticker = Ticker::spawn(1, Duration::from_millis(100), tx);
        tokio::time::sleep(Duration::from_millis(350)).await;
        drop(ticker);
        drain(&mut rx);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_event_fires_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut events = DelayedEvents::new(tx);
        events.schedule(Duration::from_secs(1), "banner");
        events.schedule(Duration::from_secs(2), "finish");

        tokio::time::sleep(Duration::from_millis(900)).await;
        assert!(drain(&mut rx).is_empty());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(drain(&mut rx), vec!["banner"]);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(drain(&mut rx), vec!["finish"]);
        assert_eq!(events.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_drops_pending_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut events = DelayedEvents::new(tx);
        events.schedule(Duration::from_secs(1), 1u32);
        events.schedule(Duration::from_secs(5), 2u32);
        events.cancel_all();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(drain(&mut rx).is_empty());
    }
}
