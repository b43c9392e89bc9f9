//! Mock identity stream.

use crate::error::SessionError;
use crate::providers::{FeedStream, IdentityEvent, IdentityStream};
use crate::state::Identity;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

struct StreamInner {
    current: IdentityEvent,
    subscribers: Vec<mpsc::UnboundedSender<IdentityEvent>>,
}

/// Mock identity stream.
///
/// Starts signed out. Every subscription immediately receives the current
/// auth state (the contract's required initial event), then live changes.
#[derive(Clone)]
pub struct MockIdentityStream {
    inner: Arc<Mutex<StreamInner>>,
}

impl MockIdentityStream {
    /// Create a mock stream with nobody signed in.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StreamInner {
                current: IdentityEvent::SignedOut,
                subscribers: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StreamInner> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Sign an identity in.
    pub fn sign_in(&self, identity: Identity) {
        self.emit(IdentityEvent::SignedIn(identity));
    }

    /// Sign the current identity out.
    pub fn sign_out(&self) {
        self.emit(IdentityEvent::SignedOut);
    }

    /// Fail the stream.
    pub fn fail(&self, error: SessionError) {
        self.emit(IdentityEvent::Failed(error));
    }

    /// Number of live subscriptions (for tests).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.lock();
        inner.subscribers.retain(|tx| !tx.is_closed());
        inner.subscribers.len()
    }

    fn emit(&self, event: IdentityEvent) {
        let mut inner = self.lock();
        inner.current = event.clone();
        inner.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl Default for MockIdentityStream {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityStream for MockIdentityStream {
    fn subscribe(&self) -> FeedStream<IdentityEvent> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let initial = {
            let mut inner = self.lock();
            inner.subscribers.push(tx);
            inner.current.clone()
        };

        Box::pin(async_stream::stream! {
            yield initial;
            while let Some(event) = rx.recv().await {
                yield event;
            }
        })
    }
}
