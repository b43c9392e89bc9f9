//! Shared plumbing for the mock document feeds.

use crate::actions::FeedEvent;
use crate::error::SessionError;
use crate::providers::FeedStream;
use crate::state::UserId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

struct FeedInner<T> {
    docs: HashMap<UserId, T>,
    denied: HashSet<UserId>,
    subscribers: HashMap<UserId, Vec<mpsc::UnboundedSender<FeedEvent<T>>>>,
}

/// In-memory document feed keyed by user id.
///
/// `deferred` feeds skip the initial snapshot so tests control exactly
/// when a subscription "delivers".
pub(super) struct MockFeed<T> {
    inner: Arc<Mutex<FeedInner<T>>>,
    collection: String,
    deferred: bool,
}

impl<T> Clone for MockFeed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            collection: self.collection.clone(),
            deferred: self.deferred,
        }
    }
}

impl<T: Clone + Send + 'static> MockFeed<T> {
    pub(super) fn new(collection: impl Into<String>, deferred: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FeedInner {
                docs: HashMap::new(),
                denied: HashSet::new(),
                subscribers: HashMap::new(),
            })),
            collection: collection.into(),
            deferred,
        }
    }

    fn lock(&self) -> MutexGuard<'_, FeedInner<T>> {
        // Poison-tolerant: a panicked test thread must not wedge the mock.
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Store a document and broadcast the snapshot to live subscriptions.
    pub(super) fn set(&self, user: &UserId, doc: T) {
        let mut inner = self.lock();
        inner.docs.insert(user.clone(), doc.clone());
        broadcast(&mut inner, user, FeedEvent::Snapshot(Some(doc)));
    }

    /// Remove a document and broadcast the confirmed absence.
    pub(super) fn clear(&self, user: &UserId) {
        let mut inner = self.lock();
        inner.docs.remove(user);
        broadcast(&mut inner, user, FeedEvent::Snapshot(None));
    }

    /// Reject future subscriptions for `user` with a permission error.
    pub(super) fn deny(&self, user: &UserId) {
        self.lock().denied.insert(user.clone());
    }

    /// Broadcast a feed failure to live subscriptions.
    pub(super) fn fail(&self, user: &UserId, error: SessionError) {
        let mut inner = self.lock();
        broadcast(&mut inner, user, FeedEvent::Failed(error));
    }

    /// Number of live subscriptions for `user` (for tests).
    pub(super) fn subscriber_count(&self, user: &UserId) -> usize {
        let mut inner = self.lock();
        prune(&mut inner, user);
        inner.subscribers.get(user).map_or(0, Vec::len)
    }

    pub(super) fn subscribe(&self, user: &UserId) -> FeedStream<FeedEvent<T>> {
        let (tx, mut rx) = mpsc::unbounded_channel();

        let initial = {
            let mut inner = self.lock();
            inner
                .subscribers
                .entry(user.clone())
                .or_default()
                .push(tx);

            if inner.denied.contains(user) {
                Some(FeedEvent::Failed(SessionError::PermissionDenied {
                    path: format!("{}/{}", self.collection, user),
                }))
            } else if self.deferred {
                None
            } else {
                Some(FeedEvent::Snapshot(inner.docs.get(user).cloned()))
            }
        };

        Box::pin(async_stream::stream! {
            if let Some(event) = initial {
                yield event;
            }
            while let Some(event) = rx.recv().await {
                yield event;
            }
        })
    }
}

fn broadcast<T: Clone>(inner: &mut FeedInner<T>, user: &UserId, event: FeedEvent<T>) {
    if let Some(senders) = inner.subscribers.get_mut(user) {
        senders.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

fn prune<T>(inner: &mut FeedInner<T>, user: &UserId) {
    if let Some(senders) = inner.subscribers.get_mut(user) {
        senders.retain(|tx| !tx.is_closed());
    }
}
