//! Session watcher.
//!
//! The imperative shell around the session reducer: spawns a store,
//! subscribes the identity stream, and hands out a [`SessionHandle`] for
//! synchronous reads and change notifications.

use crate::actions::SessionAction;
use crate::environment::SessionEnvironment;
use crate::providers::{AdminMarkerFeed, IdentityStream, ProfileFeed};
use crate::reducer::SessionReducer;
use crate::state::SessionState;
use taskfair_runtime::{Store, StoreError};
use tokio::sync::watch;

/// Handle to a running session watcher.
///
/// Cheap to clone; every clone reads the same published state.
#[derive(Clone)]
pub struct SessionHandle {
    store: Store<SessionState, SessionAction>,
}

impl SessionHandle {
    /// Read the latest published session state.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.store.state()
    }

    /// Subscribe to session state changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.store.subscribe()
    }

    /// Wait until the published state satisfies `predicate`.
    ///
    /// Returns immediately if the current state already matches.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ChannelClosed`] if the watcher shuts down
    /// while waiting.
    pub async fn wait_for(
        &self,
        predicate: impl Fn(&SessionState) -> bool,
    ) -> Result<SessionState, StoreError> {
        let mut rx = self.store.subscribe();
        loop {
            {
                let state = rx.borrow_and_update();
                if predicate(&state) {
                    return Ok(state.clone());
                }
            }
            rx.changed().await.map_err(|_| StoreError::ChannelClosed)?;
        }
    }

    /// Wait until the session finishes resolving (`is_loading == false`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ChannelClosed`] if the watcher shuts down
    /// while waiting.
    pub async fn resolved(&self) -> Result<SessionState, StoreError> {
        self.wait_for(|state| !state.is_loading).await
    }

    /// Tear the watcher down.
    ///
    /// Releases all three subscriptions; no callback mutates state and no
    /// further change is published afterwards.
    pub fn shutdown(&self) {
        self.store.shutdown();
    }
}

/// Session watcher entry point.
pub struct SessionWatcher;

impl SessionWatcher {
    /// Spawn the session aggregator for the given environment.
    ///
    /// The watcher immediately subscribes the identity stream; the
    /// per-identity document feeds are started and torn down as identities
    /// come and go.
    #[must_use]
    pub fn spawn<I, P, A>(environment: SessionEnvironment<I, P, A>) -> SessionHandle
    where
        I: IdentityStream,
        P: ProfileFeed,
        A: AdminMarkerFeed,
    {
        let store = Store::spawn(
            SessionState::default(),
            SessionReducer::<I, P, A>::new(),
            environment,
        );

        // A freshly spawned store cannot have shut down yet.
        let _ = store.send(SessionAction::Start);

        SessionHandle { store }
    }
}
