//! # CeluStock Runtime
//!
//! The [`Store`] — runtime coordinator for a reducer.
//!
//! The Store manages:
//! 1. State (behind `RwLock`; the write lock serializes mutations)
//! 2. Reducer (business logic)
//! 3. Environment (injected dependencies)
//! 4. Effect execution (background tasks with a feedback loop)
//!
//! Holding the write lock across the whole `reduce` call gives the
//! single-writer guarantee the engine requires: two concurrent commands
//! against the same record cannot both observe it present, and an undo
//! always sees the ledger as the most recently committed mutation left it.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use celustock_core::reducer::{Effect, Reducer};
use tokio::sync::RwLock;

/// Errors surfaced by [`Store`] operations.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError<E> {
    /// The store rejected the command because it is shutting down.
    #[error("store is shutting down")]
    ShuttingDown,

    /// Shutdown gave up waiting for background effects.
    #[error("shutdown timed out with {0} pending effects")]
    ShutdownTimeout(usize),

    /// The reducer rejected the command.
    #[error(transparent)]
    Command(E),
}

/// RAII guard that decrements the pending-effect counter on drop.
///
/// Ensures the counter is always decremented, even if the effect panics.
struct EffectGuard(Arc<AtomicUsize>);

impl Drop for EffectGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// The Store — runtime coordinator for a reducer.
///
/// # Example
///
/// ```ignore
/// let store = Store::new(EngineState::new(), EngineReducer::new(), env);
/// let event = store.send(EngineCommand::UndoLast).await?;
/// let count = store.state(|s| s.count()).await;
/// ```
pub struct Store<R: Reducer> {
    state: Arc<RwLock<R::State>>,
    reducer: R,
    environment: R::Environment,
    shutdown: Arc<AtomicBool>,
    pending_effects: Arc<AtomicUsize>,
}

impl<R> Clone for Store<R>
where
    R: Reducer + Clone,
    R::Environment: Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: self.reducer.clone(),
            environment: self.environment.clone(),
            shutdown: Arc::clone(&self.shutdown),
            pending_effects: Arc::clone(&self.pending_effects),
        }
    }
}

impl<R> Store<R>
where
    R: Reducer + Clone + Send + Sync + 'static,
    R::State: Send + Sync + 'static,
    R::Command: Send + 'static,
    R::Event: Send,
    R::Error: std::fmt::Display + Send,
    R::Environment: Clone + Send + Sync + 'static,
{
    /// Create a new store with initial state, reducer, and environment.
    #[must_use]
    pub fn new(initial_state: R::State, reducer: R, environment: R::Environment) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer,
            environment,
            shutdown: Arc::new(AtomicBool::new(false)),
            pending_effects: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Process one command to completion.
    ///
    /// The reducer runs under the state write lock, so the command either
    /// fully applies or fully fails with nothing observable in between.
    /// Effects are spawned after the state change is committed.
    ///
    /// # Errors
    ///
    /// - [`StoreError::ShuttingDown`] when the store no longer accepts
    ///   commands
    /// - [`StoreError::Command`] when the reducer rejects the command
    #[tracing::instrument(skip(self, command), name = "store_send")]
    pub async fn send(&self, command: R::Command) -> Result<R::Event, StoreError<R::Error>> {
        if self.shutdown.load(Ordering::Acquire) {
            tracing::warn!("Rejected command: store is shutting down");
            metrics::counter!("store.shutdown.rejected_commands").increment(1);
            return Err(StoreError::ShuttingDown);
        }

        tracing::debug!("Processing command");
        metrics::counter!("store.commands.total").increment(1);

        let (event, effects) = {
            let mut state = self.state.write().await;
            tracing::trace!("Acquired write lock on state");

            let start = std::time::Instant::now();
            let outcome = self.reducer.reduce(&mut state, command, &self.environment);
            metrics::histogram!("store.reducer.duration_seconds")
                .record(start.elapsed().as_secs_f64());

            outcome.map_err(StoreError::Command)?
        };

        // Note: Precision loss acceptable for metrics (effect counts < 2^52)
        #[allow(clippy::cast_precision_loss)]
        metrics::histogram!("store.effects.count").record(effects.len() as f64);

        tracing::trace!("Executing {} effects", effects.len());
        for effect in effects {
            self.execute_effect(effect);
        }

        Ok(event)
    }

    /// Read current state via a closure.
    ///
    /// Access state through a closure to ensure the lock is released
    /// promptly:
    ///
    /// ```ignore
    /// let available = store.state(|s| s.available_count()).await;
    /// ```
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&R::State) -> T,
    {
        let state = self.state.read().await;
        f(&state)
    }

    /// Number of effects still running in the background.
    #[must_use]
    pub fn pending_effects(&self) -> usize {
        self.pending_effects.load(Ordering::SeqCst)
    }

    /// Stop accepting commands and wait for in-flight effects to finish.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] when effects are still
    /// pending after `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError<R::Error>> {
        self.shutdown.store(true, Ordering::Release);
        tracing::info!("Store shutdown initiated");

        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let pending = self.pending_effects.load(Ordering::SeqCst);
            if pending == 0 {
                tracing::info!("Store shutdown complete");
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                tracing::warn!(pending, "Store shutdown timed out with pending effects");
                return Err(StoreError::ShutdownTimeout(pending));
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Spawn a single effect on the runtime.
    fn execute_effect(&self, effect: Effect<R::Command>) {
        match effect {
            Effect::None => {}
            Effect::Future(future) => {
                self.pending_effects.fetch_add(1, Ordering::SeqCst);
                let guard = EffectGuard(Arc::clone(&self.pending_effects));
                let store = self.clone();
                tokio::spawn(async move {
                    let _guard = guard;
                    if let Some(command) = future.await {
                        if let Err(err) = store.feedback(command).await {
                            tracing::warn!(error = %err, "Feedback command was rejected");
                        }
                    }
                });
            }
        }
    }

    /// Boxed re-entry point for commands produced by effects.
    ///
    /// Boxing erases the recursive future type (`send` → effect → `send`).
    fn feedback(
        &self,
        command: R::Command,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<(), StoreError<R::Error>>> + Send + '_>,
    > {
        Box::pin(async move {
            self.send(command).await.map(|_| ())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use celustock_core::reducer::Effects;
    use smallvec::SmallVec;

    #[derive(Clone, Debug, Default)]
    struct CounterState {
        count: i32,
    }

    #[derive(Clone, Debug)]
    enum CounterCommand {
        Add(i32),
        AddInBackground(i32),
        Reject,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum CounterEvent {
        Added(i32),
        Scheduled,
    }

    #[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
    #[error("rejected")]
    struct Rejected;

    #[derive(Clone)]
    struct CounterReducer;

    impl Reducer for CounterReducer {
        type State = CounterState;
        type Command = CounterCommand;
        type Event = CounterEvent;
        type Error = Rejected;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            command: Self::Command,
            _env: &Self::Environment,
        ) -> Result<(Self::Event, Effects<Self::Command>), Self::Error> {
            match command {
                CounterCommand::Add(n) => {
                    state.count += n;
                    Ok((CounterEvent::Added(state.count), SmallVec::new()))
                }
                CounterCommand::AddInBackground(n) => {
                    let mut effects = Effects::new();
                    effects.push(Effect::future(async move {
                        Some(CounterCommand::Add(n))
                    }));
                    Ok((CounterEvent::Scheduled, effects))
                }
                CounterCommand::Reject => Err(Rejected),
            }
        }
    }

    fn store() -> Store<CounterReducer> {
        Store::new(CounterState::default(), CounterReducer, ())
    }

    #[tokio::test]
    async fn send_returns_the_event() {
        let store = store();
        let event = store.send(CounterCommand::Add(3)).await.unwrap();
        assert_eq!(event, CounterEvent::Added(3));
        assert_eq!(store.state(|s| s.count).await, 3);
    }

    #[tokio::test]
    async fn rejected_commands_leave_state_untouched() {
        let store = store();
        store.send(CounterCommand::Add(1)).await.unwrap();

        let err = store.send(CounterCommand::Reject).await.unwrap_err();
        assert_eq!(err, StoreError::Command(Rejected));
        assert_eq!(store.state(|s| s.count).await, 1);
    }

    #[tokio::test]
    async fn effect_feedback_reaches_the_reducer() {
        let store = store();
        let event = store.send(CounterCommand::AddInBackground(5)).await.unwrap();
        assert_eq!(event, CounterEvent::Scheduled);

        // The feedback command runs on a background task; poll briefly.
        for _ in 0..100 {
            if store.state(|s| s.count).await == 5 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("feedback command never applied");
    }

    #[tokio::test]
    async fn shutdown_rejects_new_commands() {
        let store = store();
        store.shutdown(Duration::from_secs(1)).await.unwrap();

        let err = store.send(CounterCommand::Add(1)).await.unwrap_err();
        assert_eq!(err, StoreError::ShuttingDown);
    }

    #[tokio::test]
    async fn shutdown_waits_for_pending_effects() {
        let store = store();
        store.send(CounterCommand::AddInBackground(2)).await.unwrap();

        store.shutdown(Duration::from_secs(1)).await.unwrap();
        assert_eq!(store.pending_effects(), 0);
    }
}
