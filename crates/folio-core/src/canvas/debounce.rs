//! Keyed coalescing buffer that delivers a batch once pushes go quiet.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};

/// Default quiet period before a batch is delivered.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(300);

enum Command<K, V> {
    Push(K, V),
    Flush(oneshot::Sender<()>),
}

/// Collects the latest value per key and hands the batch to a flush callback
/// after `window` passes without a new push.
///
/// Every push re-arms the timer. Dropping the last handle delivers whatever
/// is still pending and stops the background task.
pub struct Debouncer<K, V> {
    tx: mpsc::UnboundedSender<Command<K, V>>,
}

impl<K, V> Debouncer<K, V>
where
    K: Eq + Hash + Send + 'static,
    V: Send + 'static,
{
    /// Spawn the debounce loop. Must be called inside a tokio runtime.
    pub fn new<F, Fut>(window: Duration, flush: F) -> Self
    where
        F: Fn(HashMap<K, V>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(rx, window, flush));
        Self { tx }
    }

    /// Record `value` for `key`, replacing any pending value.
    pub fn push(&self, key: K, value: V) {
        if self.tx.send(Command::Push(key, value)).is_err() {
            tracing::warn!("Debounce loop has stopped, update dropped");
        }
    }

    /// Deliver the pending batch now and wait until the callback finishes.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}

async fn run<K, V, F, Fut>(mut rx: mpsc::UnboundedReceiver<Command<K, V>>, window: Duration, flush: F)
where
    K: Eq + Hash,
    F: Fn(HashMap<K, V>) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut pending: HashMap<K, V> = HashMap::new();
    let mut deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            command = rx.recv() => match command {
                Some(Command::Push(key, value)) => {
                    pending.insert(key, value);
                    deadline = Some(Instant::now() + window);
                }
                Some(Command::Flush(done)) => {
                    deadline = None;
                    if !pending.is_empty() {
                        flush(std::mem::take(&mut pending)).await;
                    }
                    let _ = done.send(());
                }
                None => {
                    if !pending.is_empty() {
                        flush(std::mem::take(&mut pending)).await;
                    }
                    break;
                }
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                deadline = None;
                tracing::debug!(entries = pending.len(), "Debounce window elapsed");
                flush(std::mem::take(&mut pending)).await;
            }
        }
    }
}
