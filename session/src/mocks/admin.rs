//! Mock admin marker feed.

use super::feed::MockFeed;
use crate::actions::FeedEvent;
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::providers::{AdminMarkerFeed, FeedStream};
use crate::state::{AdminMarker, UserId};
use chrono::Utc;

/// Mock admin marker document feed.
#[derive(Clone)]
pub struct MockAdminMarkerFeed {
    feed: MockFeed<AdminMarker>,
}

impl MockAdminMarkerFeed {
    /// Create a feed that delivers an initial snapshot on subscribe.
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            feed: MockFeed::new(config.admin_marker_collection.clone(), false),
        }
    }

    /// Create a feed that withholds the initial snapshot until an
    /// explicit emission.
    #[must_use]
    pub fn deferred(config: &SessionConfig) -> Self {
        Self {
            feed: MockFeed::new(config.admin_marker_collection.clone(), true),
        }
    }

    /// Grant admin to `user` and broadcast the marker.
    pub fn grant(&self, user: &UserId) {
        self.feed.set(user, AdminMarker { granted_at: Utc::now() });
    }

    /// Revoke admin from `user` and broadcast the absence.
    pub fn revoke(&self, user: &UserId) {
        self.feed.clear(user);
    }

    /// Reject future subscriptions for `user`.
    pub fn deny(&self, user: &UserId) {
        self.feed.deny(user);
    }

    /// Broadcast a feed failure.
    pub fn fail(&self, user: &UserId, error: SessionError) {
        self.feed.fail(user, error);
    }

    /// Number of live subscriptions for `user` (for tests).
    #[must_use]
    pub fn subscriber_count(&self, user: &UserId) -> usize {
        self.feed.subscriber_count(user)
    }
}

impl AdminMarkerFeed for MockAdminMarkerFeed {
    fn subscribe(&self, user: &UserId) -> FeedStream<FeedEvent<AdminMarker>> {
        self.feed.subscribe(user)
    }
}
