//! Session state types.
//!
//! This module defines the state published by the session aggregator.
//! All types are `Clone` to support the functional architecture pattern.

use crate::error::SessionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for a user.
///
/// Wraps the opaque subject string assigned by the external identity
/// provider. Taskfair never generates these outside of tests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Wrap a provider-assigned subject string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a random `UserId` (mocks and tests).
    #[must_use]
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// The raw subject string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Identity & Profile
// ═══════════════════════════════════════════════════════════════════════

/// The authenticated subject observed from the external identity provider.
///
/// Created and destroyed entirely by the provider; the aggregator only
/// observes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider-assigned subject id.
    pub id: UserId,

    /// Email address, when the provider exposes one.
    pub email: Option<String>,

    /// Display name, when the provider exposes one.
    pub display_name: Option<String>,

    /// Avatar URL, when the provider exposes one.
    pub photo_url: Option<String>,
}

impl Identity {
    /// Create a bare identity with only a subject id.
    #[must_use]
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            email: None,
            display_name: None,
            photo_url: None,
        }
    }

    /// Set the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

impl From<UserId> for Identity {
    fn from(id: UserId) -> Self {
        Self::new(id)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// Marketplace role recorded on a profile document.
///
/// Informational only: authorization is decided by the admin marker
/// document, not this field (see [`crate::policy`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Books services.
    #[default]
    Customer,
    /// Lists services and manages availability.
    Provider,
    /// Manages users and providers.
    Admin,
}

impl Role {
    /// Get the role name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Provider => "provider",
            Self::Admin => "admin",
        }
    }

    /// Parse a role from its document string.
    ///
    /// # Errors
    ///
    /// Returns error if the role string is not recognized.
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "provider" => Ok(Self::Provider),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("Unknown role: {s}")),
        }
    }
}

/// Application-level user record keyed by identity id.
///
/// Owned by the CRUD views; the aggregator only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Identity id this profile belongs to.
    pub id: UserId,

    /// Display name.
    pub display_name: String,

    /// Contact email.
    pub email: String,

    /// Contact phone number, if provided.
    pub phone: Option<String>,

    /// Marketplace role (informational, see [`Role`]).
    pub role: Role,

    /// Profile creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Admin marker document.
///
/// Its **existence** at the per-identity marker path grants elevated
/// access; the payload is audit metadata only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminMarker {
    /// When the marker was granted.
    pub granted_at: DateTime<Utc>,
}

// ═══════════════════════════════════════════════════════════════════════
// Session State
// ═══════════════════════════════════════════════════════════════════════

/// Coarse session phase, derived from [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Nobody is signed in.
    NoIdentity,
    /// Waiting for the identity stream or the per-identity feeds.
    Resolving,
    /// Identity present and both feeds have delivered.
    Ready,
}

/// The aggregator's published snapshot.
///
/// Mutated only by the session reducer; consumers read it through the
/// session handle or context.
///
/// # Invariant
///
/// `is_loading` becomes `false` exactly once both per-identity feeds have
/// delivered at least one event (data, absence, or error) for the current
/// `generation`, and flips back to `true` only when a new identity is
/// adopted. When the identity becomes absent it is reset to `false`
/// immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Authenticated identity, if any.
    pub identity: Option<Identity>,

    /// Profile document for the identity, once delivered.
    pub profile: Option<Profile>,

    /// Admin determination (marker-document policy, see [`crate::policy`]).
    pub is_admin: bool,

    /// Whether the snapshot for the current identity is still resolving.
    pub is_loading: bool,

    /// Last subscription error, if any. Cleared on identity transitions.
    pub error: Option<SessionError>,

    /// Monotonic identity generation. Bumped on every identity transition;
    /// feed events tagged with an older generation are discarded.
    pub generation: u64,

    /// Whether the profile feed has delivered for the current generation.
    pub profile_delivered: bool,

    /// Whether the admin marker feed has delivered for the current
    /// generation.
    pub admin_delivered: bool,

    /// When the current identity finished resolving.
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Default for SessionState {
    /// Session start: loading until the identity stream's initial event.
    fn default() -> Self {
        Self {
            identity: None,
            profile: None,
            is_admin: false,
            is_loading: true,
            error: None,
            generation: 0,
            profile_delivered: false,
            admin_delivered: false,
            resolved_at: None,
        }
    }
}

impl SessionState {
    /// Derive the coarse session phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        if self.is_loading {
            SessionPhase::Resolving
        } else if self.identity.is_none() {
            SessionPhase::NoIdentity
        } else {
            SessionPhase::Ready
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_random_is_unique() {
        assert_ne!(UserId::random(), UserId::random());
    }

    #[test]
    fn role_round_trips_through_str() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::from_str("Provider"), Ok(Role::Provider));
        assert!(Role::from_str("superuser").is_err());
    }

    #[test]
    fn default_state_is_resolving() {
        let state = SessionState::default();
        assert!(state.is_loading);
        assert_eq!(state.phase(), SessionPhase::Resolving);
    }

    #[test]
    fn phase_reflects_identity_and_loading() {
        let mut state = SessionState::default();
        state.is_loading = false;
        assert_eq!(state.phase(), SessionPhase::NoIdentity);

        state.identity = Some(Identity::new("user123"));
        assert_eq!(state.phase(), SessionPhase::Ready);
    }
}
