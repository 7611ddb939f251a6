use std::collections::HashMap;
use std::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

/// Keyed registry of scheduled effects (delivery flips, simulated replies,
/// the autosave debounce, the status sweep). Scheduling under an occupied
/// key aborts the pending task first, and leaving a view cancels its keys,
/// so a stale timer can never double-apply an effect.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handle` under `key`, aborting any task already there.
    pub fn replace(&self, key: impl Into<String>, handle: JoinHandle<()>) {
        let key = key.into();
        let mut tasks = self.tasks.lock().expect("task registry poisoned");
        tasks.retain(|_, pending| !pending.is_finished());
        if let Some(previous) = tasks.insert(key.clone(), handle) {
            debug!("superseding pending task {key}");
            previous.abort();
        }
    }

    pub fn cancel(&self, key: &str) {
        let mut tasks = self.tasks.lock().expect("task registry poisoned");
        if let Some(pending) = tasks.remove(key) {
            pending.abort();
        }
    }

    /// Cancel every task whose key starts with `prefix`; used on tab
    /// switches to tear down the view being left.
    pub fn cancel_prefix(&self, prefix: &str) {
        let mut tasks = self.tasks.lock().expect("task registry poisoned");
        let keys: Vec<String> = tasks
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        for key in keys {
            if let Some(pending) = tasks.remove(&key) {
                debug!("cancelling {key} on teardown");
                pending.abort();
            }
        }
    }

    pub fn pending(&self) -> usize {
        let mut tasks = self.tasks.lock().expect("task registry poisoned");
        tasks.retain(|_, pending| !pending.is_finished());
        tasks.len()
    }
}

impl Drop for TaskRegistry {
    fn drop(&mut self) {
        if let Ok(tasks) = self.tasks.lock() {
            for pending in tasks.values() {
                pending.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn replace_aborts_the_pending_task() {
        let registry = TaskRegistry::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let first = {
            let fired = Arc::clone(&fired);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                fired.fetch_add(1, Ordering::SeqCst);
            })
        };
        registry.replace("assessment:autosave", first);

        let second = {
            let fired = Arc::clone(&fired);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                fired.fetch_add(1, Ordering::SeqCst);
            })
        };
        registry.replace("assessment:autosave", second);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1, "only the debounced task fires");
    }

    #[tokio::test]
    async fn cancel_prefix_tears_down_a_view() {
        let registry = TaskRegistry::new();
        let fired = Arc::new(AtomicUsize::new(0));

        for key in ["chat:athlete:deliver:17", "chat:athlete:reply"] {
            let fired = Arc::clone(&fired);
            registry.replace(
                key,
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    fired.fetch_add(1, Ordering::SeqCst);
                }),
            );
        }
        registry.replace(
            "status:sweep",
            tokio::spawn(async {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }),
        );

        registry.cancel_prefix("chat:athlete:");
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0, "stale chat timers never land");
        assert_eq!(registry.pending(), 0);
    }
}
