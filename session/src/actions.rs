//! Session actions.
//!
//! This module defines all possible inputs to the session reducer:
//! the `Start` command plus the events produced by the three external
//! subscriptions (identity stream, profile feed, admin marker feed).

use crate::error::SessionError;
use crate::state::{AdminMarker, Identity, Profile};
use serde::{Deserialize, Serialize};

/// One delivery from a per-identity document feed.
///
/// Every variant counts as "delivered" toward the loading gate: existing
/// data, confirmed absence, and errors all resolve a feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeedEvent<T> {
    /// A document snapshot: `Some` when the document exists, `None` when
    /// it is confirmed missing.
    Snapshot(Option<T>),

    /// The feed failed (network, permissions). Non-fatal; see
    /// [`SessionError::is_subscription_error`].
    Failed(SessionError),
}

/// Session action.
///
/// Actions are the **only** way the session state changes. The reducer is
/// a pure function: `(State, Action, Env) → (State, Effects)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionAction {
    /// Subscribe the identity stream.
    ///
    /// Sent once by the watcher when the session is started. Reducing it
    /// again resubscribes the stream (the previous subscription is
    /// cancelled first).
    Start,

    /// The identity stream delivered an event: a signed-in identity or an
    /// explicit signed-out signal.
    IdentityChanged {
        /// The current identity, or `None` when signed out.
        identity: Option<Identity>,
    },

    /// The identity stream itself failed.
    IdentityStreamFailed {
        /// The failure.
        error: SessionError,
    },

    /// The profile feed delivered for a given identity generation.
    ProfileEvent {
        /// Identity generation the subscription was started for. Events
        /// tagged with a superseded generation are discarded.
        generation: u64,

        /// The delivery.
        event: FeedEvent<Profile>,
    },

    /// The admin marker feed delivered for a given identity generation.
    AdminMarkerEvent {
        /// Identity generation the subscription was started for.
        generation: u64,

        /// The delivery.
        event: FeedEvent<AdminMarker>,
    },
}
