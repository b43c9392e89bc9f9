//! Store runtime for coordinating reducer execution and effect handling.

use futures::future::BoxFuture;
use futures::stream::StreamExt;
use std::collections::HashMap;
use taskfair_core::effect::{Effect, EffectId};
use taskfair_core::reducer::Reducer;
use tokio::sync::{mpsc, watch};
use tokio::task::{AbortHandle, JoinSet};

use crate::error::StoreError;

/// Internal message type for the store task.
enum StoreMsg<A> {
    /// An action to reduce.
    Action(A),
    /// Stop the store task and abort all running effects.
    Shutdown,
}

/// The Store - runtime coordinator for a reducer.
///
/// The Store owns:
/// 1. State (owned by a single task; all reductions are serialized)
/// 2. Reducer (business logic)
/// 3. Environment (injected dependencies)
/// 4. Effect execution (spawned tasks with a feedback loop into the reducer)
///
/// State is published after every reduction through a `watch` channel, so
/// consumers can read the latest snapshot synchronously at any time or
/// await changes.
///
/// # Cancellation
///
/// Effects wrapped in `Effect::Cancellable { id, .. }` register the abort
/// handles of their spawned tasks under `id`. Reducing an
/// `Effect::Cancel(id)` aborts those tasks *before* the next queued action
/// is processed, so a reducer that cancels a superseded subscription scope
/// is guaranteed no further task for that scope is still being driven.
/// (Actions the old tasks already queued may still arrive; reducers guard
/// against those with their own staleness checks.)
///
/// # Example
///
/// ```ignore
/// let store = Store::spawn(SessionState::default(), SessionReducer, env);
/// store.send(SessionAction::Start)?;
/// let snapshot = store.state();
/// ```
pub struct Store<S, A> {
    messages: mpsc::UnboundedSender<StoreMsg<A>>,
    state_rx: watch::Receiver<S>,
}

// Manual Clone: `S` and `A` need not be Clone for the handle itself.
impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            messages: self.messages.clone(),
            state_rx: self.state_rx.clone(),
        }
    }
}

impl<S, A> Store<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Send + 'static,
{
    /// Spawn a store task with initial state, reducer, and environment.
    ///
    /// The returned handle is cheap to clone and can be shared across
    /// tasks. The store task runs until [`Store::shutdown`] is called or
    /// every handle is dropped; on exit all running effect tasks are
    /// aborted.
    #[must_use]
    pub fn spawn<E, R>(initial_state: S, reducer: R, environment: E) -> Self
    where
        E: Send + 'static,
        R: Reducer<State = S, Action = A, Environment = E> + Send + 'static,
    {
        let (messages, inbox) = mpsc::unbounded_channel::<StoreMsg<A>>();
        let (state_tx, state_rx) = watch::channel(initial_state.clone());

        let feedback = messages.clone();
        tokio::spawn(store_loop(
            initial_state,
            reducer,
            environment,
            inbox,
            state_tx,
            feedback,
        ));

        Self { messages, state_rx }
    }

    /// Send an action to the store.
    ///
    /// The action is queued; the store task reduces it, executes the
    /// returned effects, and publishes the new state. `send` returns as
    /// soon as the action is queued.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] if the store task has
    /// exited.
    pub fn send(&self, action: A) -> Result<(), StoreError> {
        self.messages
            .send(StoreMsg::Action(action))
            .map_err(|_| StoreError::ShutdownInProgress)
    }

    /// Read the latest published state.
    #[must_use]
    pub fn state(&self) -> S {
        self.state_rx.borrow().clone()
    }

    /// Read the latest published state without cloning.
    pub fn with_state<T>(&self, f: impl FnOnce(&S) -> T) -> T {
        f(&self.state_rx.borrow())
    }

    /// Subscribe to state changes.
    ///
    /// The receiver yields a change notification after every reduction.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.state_rx.clone()
    }

    /// Stop the store task and abort all running effect tasks.
    ///
    /// Idempotent: calling shutdown on an already-stopped store is a no-op.
    /// After shutdown, no effect callback can mutate state and no further
    /// state change is published.
    pub fn shutdown(&self) {
        let _ = self.messages.send(StoreMsg::Shutdown);
    }
}

/// The store task: serialize reductions, execute effects, publish state.
async fn store_loop<S, A, E, R>(
    mut state: S,
    reducer: R,
    environment: E,
    mut inbox: mpsc::UnboundedReceiver<StoreMsg<A>>,
    state_tx: watch::Sender<S>,
    feedback: mpsc::UnboundedSender<StoreMsg<A>>,
) where
    S: Clone + Send + Sync + 'static,
    A: Send + 'static,
    E: Send + 'static,
    R: Reducer<State = S, Action = A, Environment = E> + Send + 'static,
{
    // Dropping the JoinSet on exit aborts every effect task, scoped or not.
    let mut tasks: JoinSet<()> = JoinSet::new();
    let mut scopes: HashMap<EffectId, Vec<AbortHandle>> = HashMap::new();

    loop {
        tokio::select! {
            msg = inbox.recv() => match msg {
                Some(StoreMsg::Action(action)) => {
                    let effects = reducer.reduce(&mut state, action, &environment);
                    metrics::counter!("store.actions.processed").increment(1);

                    for effect in effects {
                        execute(effect, None, &mut scopes, &mut tasks, &feedback);
                    }

                    state_tx.send_replace(state.clone());
                },
                Some(StoreMsg::Shutdown) | None => {
                    tracing::debug!("store task stopping");
                    break;
                },
            },
            // Reap finished effect tasks so the JoinSet doesn't accumulate
            // completed entries over a long-lived store.
            Some(_) = tasks.join_next(), if !tasks.is_empty() => {},
        }
    }
}

/// Walk an effect tree, spawning leaf work and handling cancellation scopes.
///
/// Cancellation bookkeeping happens only in this synchronous walk:
/// `Cancel` aborts immediately, and `Cancellable` registers the abort
/// handles of the tasks spawned beneath it. Effects nested inside a
/// `Sequential` run within one task and are covered by that task's handle.
fn execute<A: Send + 'static>(
    effect: Effect<A>,
    scope: Option<EffectId>,
    scopes: &mut HashMap<EffectId, Vec<AbortHandle>>,
    tasks: &mut JoinSet<()>,
    feedback: &mpsc::UnboundedSender<StoreMsg<A>>,
) {
    match effect {
        Effect::None => {},
        Effect::Parallel(effects) => {
            for effect in effects {
                execute(effect, scope, scopes, tasks, feedback);
            }
        },
        Effect::Cancellable { id, effect } => {
            execute(*effect, Some(id), scopes, tasks, feedback);
        },
        Effect::Cancel(id) => {
            if let Some(handles) = scopes.remove(&id) {
                tracing::debug!(scope = %id, tasks = handles.len(), "cancelling effect scope");
                metrics::counter!("store.effects.cancelled").increment(handles.len() as u64);
                for handle in handles {
                    handle.abort();
                }
            }
        },
        leaf => {
            let tx = feedback.clone();
            let handle = tasks.spawn(run_inline(leaf, tx));
            if let Some(id) = scope {
                scopes.entry(id).or_default().push(handle);
            }
        },
    }
}

/// Run an effect inside an already-spawned task.
///
/// `Cancel` has no scope table here and is ignored with a warning;
/// reducers are expected to emit cancellations at the top level of their
/// effect vector.
fn run_inline<A: Send + 'static>(
    effect: Effect<A>,
    feedback: mpsc::UnboundedSender<StoreMsg<A>>,
) -> BoxFuture<'static, ()> {
    Box::pin(async move {
        match effect {
            Effect::None => {},
            Effect::Future(future) => {
                if let Some(action) = future.await {
                    let _ = feedback.send(StoreMsg::Action(action));
                }
            },
            Effect::Delay { duration, action } => {
                tokio::time::sleep(duration).await;
                let _ = feedback.send(StoreMsg::Action(*action));
            },
            Effect::Stream(mut stream) => {
                while let Some(action) = stream.next().await {
                    if feedback.send(StoreMsg::Action(action)).is_err() {
                        break;
                    }
                }
            },
            Effect::Parallel(effects) => {
                let futures = effects
                    .into_iter()
                    .map(|e| run_inline(e, feedback.clone()));
                futures::future::join_all(futures).await;
            },
            Effect::Sequential(effects) => {
                for effect in effects {
                    run_inline(effect, feedback.clone()).await;
                }
            },
            Effect::Cancellable { effect, .. } => {
                run_inline(*effect, feedback).await;
            },
            Effect::Cancel(id) => {
                tracing::warn!(scope = %id, "Effect::Cancel nested inside a task is ignored");
            },
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)] // Test code can unwrap
mod tests {
    use super::*;
    use futures::stream;
    use std::time::Duration;
    use taskfair_core::{smallvec, SmallVec};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct CounterState {
        count: i32,
        stopped: bool,
    }

    #[derive(Debug, Clone)]
    enum CounterAction {
        Increment,
        StartTicker { scope: u64 },
        StopTicker { scope: u64 },
        Tick,
    }

    struct CounterEnv;

    struct CounterReducer;

    const TICKER: &str = "ticker";

    impl Reducer for CounterReducer {
        type State = CounterState;
        type Action = CounterAction;
        type Environment = CounterEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                CounterAction::Increment | CounterAction::Tick => {
                    state.count += 1;
                    smallvec![]
                },
                CounterAction::StartTicker { scope } => {
                    let ticks = stream::unfold(0u32, |n| async move {
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        Some((CounterAction::Tick, n + 1))
                    });
                    smallvec![Effect::Stream(Box::pin(ticks))
                        .cancellable(EffectId::scoped(TICKER, scope))]
                },
                CounterAction::StopTicker { scope } => {
                    state.stopped = true;
                    smallvec![Effect::Cancel(EffectId::scoped(TICKER, scope))]
                },
            }
        }
    }

    async fn wait_for<S: Clone + Send + Sync + 'static>(
        rx: &mut watch::Receiver<S>,
        predicate: impl Fn(&S) -> bool,
    ) {
        loop {
            if predicate(&rx.borrow()) {
                return;
            }
            rx.changed().await.unwrap();
        }
    }

    #[tokio::test]
    async fn actions_are_reduced_and_state_published() {
        let store = Store::spawn(CounterState::default(), CounterReducer, CounterEnv);
        let mut rx = store.subscribe();

        store.send(CounterAction::Increment).unwrap();
        store.send(CounterAction::Increment).unwrap();

        wait_for(&mut rx, |s: &CounterState| s.count == 2).await;
        assert_eq!(store.state().count, 2);
    }

    #[tokio::test]
    async fn stream_effects_feed_actions_back() {
        let store = Store::spawn(CounterState::default(), CounterReducer, CounterEnv);
        let mut rx = store.subscribe();

        store.send(CounterAction::StartTicker { scope: 1 }).unwrap();

        wait_for(&mut rx, |s: &CounterState| s.count >= 3).await;
    }

    #[tokio::test]
    async fn cancel_stops_a_scoped_stream() {
        let store = Store::spawn(CounterState::default(), CounterReducer, CounterEnv);
        let mut rx = store.subscribe();

        store.send(CounterAction::StartTicker { scope: 1 }).unwrap();
        wait_for(&mut rx, |s: &CounterState| s.count >= 1).await;

        store.send(CounterAction::StopTicker { scope: 1 }).unwrap();
        wait_for(&mut rx, |s: &CounterState| s.stopped).await;

        // Give any straggler ticks time to drain, then confirm the count
        // has settled.
        tokio::time::sleep(Duration::from_millis(30)).await;
        let settled = store.state().count;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(store.state().count, settled);
    }

    #[tokio::test]
    async fn cancelling_unknown_scope_is_noop() {
        let store = Store::spawn(CounterState::default(), CounterReducer, CounterEnv);
        let mut rx = store.subscribe();

        store.send(CounterAction::StopTicker { scope: 42 }).unwrap();
        wait_for(&mut rx, |s: &CounterState| s.stopped).await;
    }

    #[tokio::test]
    async fn send_after_shutdown_fails() {
        let store = Store::spawn(CounterState::default(), CounterReducer, CounterEnv);
        store.shutdown();

        // The store task exits asynchronously; poll until send fails.
        for _ in 0..100 {
            if store.send(CounterAction::Increment).is_err() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(matches!(
            store.send(CounterAction::Increment),
            Err(StoreError::ShutdownInProgress)
        ));
    }

    #[tokio::test]
    async fn shutdown_aborts_running_streams() {
        let store = Store::spawn(CounterState::default(), CounterReducer, CounterEnv);
        let mut rx = store.subscribe();

        store.send(CounterAction::StartTicker { scope: 1 }).unwrap();
        wait_for(&mut rx, |s: &CounterState| s.count >= 1).await;

        store.shutdown();
        tokio::time::sleep(Duration::from_millis(30)).await;

        // No state change is published after shutdown.
        let settled = rx.borrow().count;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(rx.borrow().count, settled);
    }
}
