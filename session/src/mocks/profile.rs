//! Mock profile feed.

use super::feed::MockFeed;
use crate::actions::FeedEvent;
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::providers::{FeedStream, ProfileFeed};
use crate::state::{Profile, UserId};

/// Mock profile document feed.
///
/// Uses in-memory storage; subscriptions behave like snapshot listeners
/// on the configured profile collection.
#[derive(Clone)]
pub struct MockProfileFeed {
    feed: MockFeed<Profile>,
}

impl MockProfileFeed {
    /// Create a feed that delivers an initial snapshot on subscribe.
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            feed: MockFeed::new(config.profile_collection.clone(), false),
        }
    }

    /// Create a feed that withholds the initial snapshot until an
    /// explicit emission, so tests control delivery order.
    #[must_use]
    pub fn deferred(config: &SessionConfig) -> Self {
        Self {
            feed: MockFeed::new(config.profile_collection.clone(), true),
        }
    }

    /// Store a profile and broadcast it.
    pub fn set(&self, profile: Profile) {
        let user = profile.id.clone();
        self.feed.set(&user, profile);
    }

    /// Delete a profile and broadcast the absence.
    pub fn clear(&self, user: &UserId) {
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

impl ProfileFeed for MockProfileFeed {
    fn subscribe(&self, user: &UserId) -> FeedStream<FeedEvent<Profile>> {
        self.feed.subscribe(user)
    }
}
