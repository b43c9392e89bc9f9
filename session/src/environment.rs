//! Session environment.
//!
//! This module defines the environment type for dependency injection in
//! the session reducer.

use crate::config::SessionConfig;
use crate::providers::{AdminMarkerFeed, IdentityStream, ProfileFeed};
use std::sync::Arc;
use taskfair_core::clock::Clock;

/// Session environment.
///
/// Contains the external dependencies needed by the session reducer.
///
/// # Type Parameters
///
/// - `I`: identity stream
/// - `P`: profile document feed
/// - `A`: admin marker document feed
#[derive(Clone)]
pub struct SessionEnvironment<I, P, A>
where
    I: IdentityStream,
    P: ProfileFeed,
    A: AdminMarkerFeed,
{
    /// Identity-change event stream.
    pub identity: I,

    /// Profile document feed.
    pub profiles: P,

    /// Admin marker document feed.
    pub admin_markers: A,

    /// Time source (fixed in tests).
    pub clock: Arc<dyn Clock>,

    /// Collection configuration.
    pub config: SessionConfig,
}

impl<I, P, A> SessionEnvironment<I, P, A>
where
    I: IdentityStream,
    P: ProfileFeed,
    A: AdminMarkerFeed,
{
    /// Create a new session environment with default configuration.
    #[must_use]
    pub fn new(identity: I, profiles: P, admin_markers: A, clock: Arc<dyn Clock>) -> Self {
        Self {
            identity,
            profiles,
            admin_markers,
            clock,
            config: SessionConfig::default(),
        }
    }

    /// Override the collection configuration.
    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }
}
