//! The session reducer.
//!
//! Pure transition function merging three independently-arriving
//! asynchronous signals (identity, profile, admin marker) into one
//! consistent [`SessionState`]. Subscriptions are expressed as stream
//! effects under cancellation scopes; the runtime tears down a superseded
//! generation's feeds before the next action is reduced, and the
//! generation tag on feed events discards anything already queued.

use crate::actions::{FeedEvent, SessionAction};
use crate::environment::SessionEnvironment;
use crate::policy::is_admin;
use crate::providers::{AdminMarkerFeed, IdentityEvent, IdentityStream, ProfileFeed};
use crate::state::SessionState;
use futures::stream::StreamExt;
use futures::stream;
use std::marker::PhantomData;
use taskfair_core::effect::{Effect, EffectId};
use taskfair_core::reducer::Reducer;
use taskfair_core::{smallvec, SmallVec};

/// Cancellation scope for the root identity subscription.
const IDENTITY_SCOPE: &str = "session-identity";

/// Cancellation scope label for the per-generation document feeds.
const FEEDS_SCOPE: &str = "session-feeds";

/// Scope id of the identity stream subscription.
#[must_use]
const fn identity_scope() -> EffectId {
    EffectId::scoped(IDENTITY_SCOPE, 0)
}

/// Scope id of the document feeds started for `generation`.
#[must_use]
pub(crate) const fn feeds_scope(generation: u64) -> EffectId {
    EffectId::scoped(FEEDS_SCOPE, generation)
}

/// Session reducer.
///
/// # Type Parameters
///
/// - `I`: identity stream
/// - `P`: profile document feed
/// - `A`: admin marker document feed
#[derive(Clone, Debug)]
pub struct SessionReducer<I, P, A>
where
    I: IdentityStream,
    P: ProfileFeed,
    A: AdminMarkerFeed,
{
    _providers: PhantomData<(I, P, A)>,
}

impl<I, P, A> SessionReducer<I, P, A>
where
    I: IdentityStream,
    P: ProfileFeed,
    A: AdminMarkerFeed,
{
    /// Create a new session reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _providers: PhantomData,
        }
    }
}

impl<I, P, A> Default for SessionReducer<I, P, A>
where
    I: IdentityStream,
    P: ProfileFeed,
    A: AdminMarkerFeed,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<I, P, A> Reducer for SessionReducer<I, P, A>
where
    I: IdentityStream,
    P: ProfileFeed,
    A: AdminMarkerFeed,
{
    type State = SessionState;
    type Action = SessionAction;
    type Environment = SessionEnvironment<I, P, A>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            SessionAction::Start => {
                // Subscription happens when the runtime first polls the
                // stream, keeping this reduction free of side effects.
                let identity = env.identity.clone();
                let events = stream::once(async move { identity.subscribe() })
                    .flatten()
                    .map(|event| match event {
                        IdentityEvent::SignedIn(identity) => SessionAction::IdentityChanged {
                            identity: Some(identity),
                        },
                        IdentityEvent::SignedOut => {
                            SessionAction::IdentityChanged { identity: None }
                        },
                        IdentityEvent::Failed(error) => {
                            SessionAction::IdentityStreamFailed { error }
                        },
                    });

                smallvec![
                    Effect::Cancel(identity_scope()),
                    Effect::Stream(events.boxed()).cancellable(identity_scope()),
                ]
            },

            SessionAction::IdentityChanged {
                identity: Some(identity),
            } => {
                let same_subject = state
                    .identity
                    .as_ref()
                    .is_some_and(|current| current.id == identity.id);
                if same_subject {
                    // Refreshed identity record (token renewal etc.): update
                    // the record without resubscribing or resetting loading.
                    state.identity = Some(identity);
                    return smallvec![];
                }

                let superseded = feeds_scope(state.generation);
                state.generation += 1;
                let generation = state.generation;

                tracing::debug!(user = %identity.id, generation, "identity adopted; starting feeds");

                let user = identity.id.clone();
                state.identity = Some(identity);
                state.profile = None;
                state.is_admin = false;
                state.is_loading = true;
                state.error = None;
                state.profile_delivered = false;
                state.admin_delivered = false;
                state.resolved_at = None;

                let profiles = env.profiles.clone();
                let profile_user = user.clone();
                let profile_events = stream::once(async move {
                    profiles.subscribe(&profile_user)
                })
                .flatten()
                .map(move |event| SessionAction::ProfileEvent { generation, event });

                let markers = env.admin_markers.clone();
                let marker_events = stream::once(async move {
                    markers.subscribe(&user)
                })
                .flatten()
                .map(move |event| SessionAction::AdminMarkerEvent { generation, event });

                smallvec![
                    Effect::Cancel(superseded),
                    Effect::merge(vec![
                        Effect::Stream(profile_events.boxed()),
                        Effect::Stream(marker_events.boxed()),
                    ])
                    .cancellable(feeds_scope(generation)),
                ]
            },

            SessionAction::IdentityChanged { identity: None } => {
                let superseded = feeds_scope(state.generation);
                state.generation += 1;

                tracing::debug!(generation = state.generation, "signed out; session reset");

                reset_signed_out(state, None);
                smallvec![Effect::Cancel(superseded)]
            },

            SessionAction::IdentityStreamFailed { error } => {
                let superseded = feeds_scope(state.generation);
                state.generation += 1;

                tracing::warn!(%error, "identity stream failed; session reset");

                reset_signed_out(state, Some(error));
                smallvec![Effect::Cancel(superseded)]
            },

            SessionAction::ProfileEvent { generation, event } => {
                if generation != state.generation {
                    tracing::trace!(generation, current = state.generation, "discarding stale profile event");
                    return smallvec![];
                }

                match event {
                    FeedEvent::Snapshot(profile) => state.profile = profile,
                    FeedEvent::Failed(error) => {
                        // Degraded: absent profile, but the feed counts as
                        // delivered so loading still resolves.
                        tracing::warn!(%error, "profile feed error");
                        state.error = Some(error);
                    },
                }
                state.profile_delivered = true;

                finish_if_resolved(state, env);
                smallvec![]
            },

            SessionAction::AdminMarkerEvent { generation, event } => {
                if generation != state.generation {
                    tracing::trace!(generation, current = state.generation, "discarding stale admin event");
                    return smallvec![];
                }

                match event {
                    FeedEvent::Snapshot(marker) => {
                        state.is_admin = is_admin(state.profile.as_ref(), marker.as_ref());
                    },
                    FeedEvent::Failed(error) => {
                        tracing::warn!(%error, "admin marker feed error");
                        state.is_admin = false;
                        state.error = Some(error);
                    },
                }
                state.admin_delivered = true;

                finish_if_resolved(state, env);
                smallvec![]
            },
        }
    }
}

/// Reset to the signed-out snapshot. Synchronous: consumers observe the
/// reset on the very next published state.
fn reset_signed_out(state: &mut SessionState, error: Option<crate::error::SessionError>) {
    state.identity = None;
    state.profile = None;
    state.is_admin = false;
    state.is_loading = false;
    state.error = error;
    state.profile_delivered = false;
    state.admin_delivered = false;
    state.resolved_at = None;
}

/// Flip the loading gate once both feeds have delivered for the current
/// generation. Later re-deliveries on an already-resolved feed update data
/// without touching `is_loading`.
fn finish_if_resolved<I, P, A>(state: &mut SessionState, env: &SessionEnvironment<I, P, A>)
where
    I: IdentityStream,
    P: ProfileFeed,
    A: AdminMarkerFeed,
{
    if state.is_loading && state.profile_delivered && state.admin_delivered {
        state.is_loading = false;
        state.resolved_at = Some(env.clock.now());
        tracing::debug!(
            generation = state.generation,
            is_admin = state.is_admin,
            has_profile = state.profile.is_some(),
            "session resolved"
        );
    }
}
