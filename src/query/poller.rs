use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::fmt::Display;

use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_info;

/// What a poll tick decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStep {
    Continue,
    Stop,
}

struct PollTask {
    cancel_token: CancellationToken,
    handle: JoinHandle<()>,
}

impl PollTask {
    fn is_running(&self) -> bool {
        !self.handle.is_finished() && !self.cancel_token.is_cancelled()
    }
}

/// One background polling loop per key.
///
/// Loops end on their own when a tick returns `PollStep::Stop`, or when the
/// key is stopped. Dropping the poller tears every loop down.
pub struct Poller<K> {
    tasks: HashMap<K, PollTask>,
}

impl<K> Default for Poller<K> {
    fn default() -> Self {
        Self {
            tasks: HashMap::new(),
        }
    }
}

impl<K> Poller<K>
where
    K: Eq + Hash + Clone + Display + Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts polling `key` unless a loop for it is already running.
    ///
    /// The first tick fires one `interval` from now; the caller has just
    /// fetched. Returns whether a new loop was spawned.
    pub fn start<F, Fut>(&mut self, key: K, interval: Duration, mut tick: F) -> bool
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = PollStep> + Send + 'static,
    {
        if self.is_polling(&key) {
            return false;
        }

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();
        let label = key.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if tick().await == PollStep::Stop {
                            log_info!("polling for {label} finished");
                            break;
                        }
                    }
                    _ = token_clone.cancelled() => {
                        log_info!("polling for {label} cancelled");
                        break;
                    }
                }
            }
        });

        self.tasks.insert(
            key,
            PollTask {
                cancel_token,
                handle,
            },
        );
        true
    }

    pub fn is_polling(&self, key: &K) -> bool {
        self.tasks.get(key).map(PollTask::is_running).unwrap_or(false)
    }

    pub fn stop(&mut self, key: &K) {
        if let Some(task) = self.tasks.remove(key) {
            task.cancel_token.cancel();
        }
    }

    pub fn stop_all(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.cancel_token.cancel();
        }
    }

    /// Forgets loops that have already ended.
    pub fn prune(&mut self) {
        self.tasks.retain(|_, task| task.is_running());
    }

    pub fn active_count(&self) -> usize {
        self.tasks.values().filter(|task| task.is_running()).count()
    }
}

impl<K> Drop for Poller<K> {
    fn drop(&mut self) {
        for task in self.tasks.values() {
            task.cancel_token.cancel();
        }
    }
}
