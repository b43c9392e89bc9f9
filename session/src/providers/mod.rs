//! Provider traits for the three external subscriptions.
//!
//! These traits are the seams to the external identity/database SDK. The
//! aggregator never talks to an SDK directly (out of scope); adapters
//! implement these traits, and [`crate::mocks`] provides in-memory
//! implementations for tests.
//!
//! # Unsubscribe contract
//!
//! Dropping a returned stream releases the subscription. The runtime
//! aborts the task driving a stream when its cancellation scope is torn
//! down, which drops the stream; implementations must not deliver events
//! anywhere else after that.

mod identity;

pub use identity::IdentityEvent;

use crate::actions::FeedEvent;
use crate::state::{AdminMarker, Profile, UserId};
use futures::stream::BoxStream;

/// A boxed subscription stream.
pub type FeedStream<T> = BoxStream<'static, T>;

/// Identity-change event stream.
///
/// # Contract
///
/// - Must deliver an initial event even when nobody is signed in
///   ([`IdentityEvent::SignedOut`]).
/// - Events are delivered in provider order.
pub trait IdentityStream: Clone + Send + Sync + 'static {
    /// Subscribe to identity changes.
    fn subscribe(&self) -> FeedStream<IdentityEvent>;
}

/// Profile document feed, keyed by identity id.
///
/// # Contract
///
/// - Delivers an initial snapshot (existing document or confirmed
///   absence) or an error, then further snapshots as the document changes.
pub trait ProfileFeed: Clone + Send + Sync + 'static {
    /// Subscribe to the profile document for `user`.
    fn subscribe(&self, user: &UserId) -> FeedStream<FeedEvent<Profile>>;
}

/// Admin marker document feed, keyed by identity id.
///
/// The marker's existence is the single source of admin truth (see
/// [`crate::policy`]).
///
/// # Contract
///
/// Same delivery contract as [`ProfileFeed`]. Reads commonly fail with
/// permission errors for non-admins; those are delivered as
/// [`FeedEvent::Failed`] and degrade to "not admin".
pub trait AdminMarkerFeed: Clone + Send + Sync + 'static {
    /// Subscribe to the admin marker document for `user`.
    fn subscribe(&self, user: &UserId) -> FeedStream<FeedEvent<AdminMarker>>;
}
