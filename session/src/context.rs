//! Consumer-facing session context.
//!
//! Pages and views read the session through two accessor shapes:
//!
//! - [`SessionContext::identity_view`] — the lightweight
//!   `{identity, is_loading, error}` view, always available;
//! - [`SessionContext::full_view`] — the full snapshot plus the underlying
//!   service handles, failing fast when the services were never supplied.

use crate::environment::SessionEnvironment;
use crate::error::{Result, SessionError};
use crate::providers::{AdminMarkerFeed, IdentityStream, ProfileFeed};
use crate::state::{Identity, Profile, SessionState};
use crate::watcher::{SessionHandle, SessionWatcher};

/// Minimal identity-only view.
///
/// Reading it never fails: when the services were never configured it
/// reports no identity, not loading, and a configuration error — it does
/// not treat profile/admin fetch problems as fatal.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityView {
    /// Authenticated identity, if any.
    pub identity: Option<Identity>,

    /// Whether the session is still resolving.
    pub is_loading: bool,

    /// Last session error, if any.
    pub error: Option<SessionError>,
}

/// Full session view: the complete snapshot plus service handles.
#[derive(Clone)]
pub struct FullSessionView<'a, I, P, A>
where
    I: IdentityStream,
    P: ProfileFeed,
    A: AdminMarkerFeed,
{
    /// The underlying service handles.
    pub services: &'a SessionEnvironment<I, P, A>,

    /// Authenticated identity, if any.
    pub identity: Option<Identity>,

    /// Profile document, once delivered.
    pub profile: Option<Profile>,

    /// Admin determination.
    pub is_admin: bool,

    /// Whether the session is still resolving.
    pub is_loading: bool,

    /// Last session error, if any.
    pub error: Option<SessionError>,
}

/// Application-wide session context.
///
/// Owns the watcher handle and the service handles it was started with.
pub struct SessionContext<I, P, A>
where
    I: IdentityStream,
    P: ProfileFeed,
    A: AdminMarkerFeed,
{
    services: Option<SessionEnvironment<I, P, A>>,
    handle: Option<SessionHandle>,
}

impl<I, P, A> SessionContext<I, P, A>
where
    I: IdentityStream,
    P: ProfileFeed,
    A: AdminMarkerFeed,
{
    /// Start the session aggregator and build a configured context.
    #[must_use]
    pub fn start(environment: SessionEnvironment<I, P, A>) -> Self {
        let handle = SessionWatcher::spawn(environment.clone());
        Self {
            services: Some(environment),
            handle: Some(handle),
        }
    }

    /// Build a context with no services configured.
    ///
    /// [`Self::identity_view`] degrades gracefully;
    /// [`Self::full_view`] fails fast.
    #[must_use]
    pub const fn offline() -> Self {
        Self {
            services: None,
            handle: None,
        }
    }

    /// Whether the underlying services were supplied.
    #[must_use]
    pub const fn services_available(&self) -> bool {
        self.services.is_some()
    }

    /// The minimal identity-only view.
    #[must_use]
    pub fn identity_view(&self) -> IdentityView {
        match &self.handle {
            Some(handle) => {
                let state = handle.snapshot();
                IdentityView {
                    identity: state.identity,
                    is_loading: state.is_loading,
                    error: state.error,
                }
            },
            None => IdentityView {
                identity: None,
                is_loading: false,
                error: Some(SessionError::ServicesUnavailable),
            },
        }
    }

    /// The full session view.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ServicesUnavailable`] immediately when the
    /// services were never supplied — never a partially-populated view.
    pub fn full_view(&self) -> Result<FullSessionView<'_, I, P, A>> {
        let (services, handle) = match (&self.services, &self.handle) {
            (Some(services), Some(handle)) => (services, handle),
            _ => return Err(SessionError::ServicesUnavailable),
        };

        let state = handle.snapshot();
        Ok(FullSessionView {
            services,
            identity: state.identity,
            profile: state.profile,
            is_admin: state.is_admin,
            is_loading: state.is_loading,
            error: state.error,
        })
    }

    /// The raw session state, when configured.
    #[must_use]
    pub fn state(&self) -> Option<SessionState> {
        self.handle.as_ref().map(SessionHandle::snapshot)
    }

    /// The watcher handle, when configured.
    #[must_use]
    pub const fn handle(&self) -> Option<&SessionHandle> {
        self.handle.as_ref()
    }

    /// Tear down the watcher, if one is running.
    pub fn shutdown(&self) {
        if let Some(handle) = &self.handle {
            handle.shutdown();
        }
    }
}
