use log::debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Snapshot published to subscribers of a [`Debouncer`].
#[derive(Debug, Clone, PartialEq)]
pub struct DebounceState<T> {
    pub value: T,
    pub pending: bool,
    // bumped on every input and on teardown; a timer only publishes for its own generation
    generation: u64,
}

/// Holds back a changing value until it has stayed put for `delay`.
///
/// Every [`set`](Debouncer::set) cancels the scheduled emission and schedules a
/// new one, so rapid inputs keep pushing the emission back. `pending` is true
/// from the moment a value arrives until it is emitted. Dropping the debouncer
/// cancels whatever is scheduled.
pub struct Debouncer<T> {
    tx: Arc<watch::Sender<DebounceState<T>>>,
    delay: Duration,
    timer: Option<JoinHandle<()>>,
}

impl<T> Debouncer<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(initial: T, delay: Duration) -> Self {
        let (tx, _) = watch::channel(DebounceState {
            value: initial,
            pending: false,
            generation: 0,
        });
        Self {
            tx: Arc::new(tx),
            delay,
            timer: None,
        }
    }

    // Must be called from within a tokio runtime.
    pub fn set(&mut self, value: T) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }

        let mut generation = 0;
        self.tx.send_modify(|state| {
            state.generation += 1;
            state.pending = true;
            generation = state.generation;
        });

        let tx = Arc::clone(&self.tx);
        let delay = self.delay;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let published = tx.send_if_modified(|state| {
                if state.generation != generation {
                    return false;
                }
                state.value = value;
                state.pending = false;
                true
            });
            if !published {
                debug!("Debounce generation {} superseded before publishing", generation);
            }
        }));
    }

    /// The last emitted value.
    pub fn value(&self) -> T {
        self.tx.borrow().value.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.tx.borrow().pending
    }

    pub fn subscribe(&self) -> watch::Receiver<DebounceState<T>> {
        self.tx.subscribe()
    }

    /// Waits until no value is pending and returns the emitted value.
    #[cfg(test)]
    pub async fn settled(&self) -> T {
        let mut rx = self.tx.subscribe();
        let settled = match rx.wait_for(|state| !state.pending).await {
            Ok(state) => Some(state.value.clone()),
            Err(_) => None,
        };
        settled.unwrap_or_else(|| self.value())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.tx.send_if_modified(|state| {
            state.generation += 1;
            let was_pending = state.pending;
            state.pending = false;
            was_pending
        });
    }
}
