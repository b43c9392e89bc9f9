//! Error types for session aggregation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Error taxonomy for the session layer.
///
/// Two categories with different propagation policies:
///
/// - **Configuration errors** ([`SessionError::ServicesUnavailable`]) are
///   fatal usage errors: the full session view fails fast instead of
///   silently degrading.
/// - **Subscription errors** (everything else) are non-fatal: recorded in
///   [`SessionState::error`](crate::state::SessionState), they still count
///   toward the loading gate so the UI degrades (no profile, not admin)
///   instead of loading forever.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionError {
    /// Session services were never supplied to the aggregator.
    #[error("Session services are not configured")]
    ServicesUnavailable,

    /// The identity stream reported an error.
    #[error("Identity stream error: {message}")]
    IdentityStream {
        /// Provider-reported failure description.
        message: String,
    },

    /// The profile feed reported an error.
    #[error("Profile feed error: {message}")]
    ProfileFeed {
        /// Provider-reported failure description.
        message: String,
    },

    /// The admin marker feed reported an error.
    #[error("Admin marker feed error: {message}")]
    AdminFeed {
        /// Provider-reported failure description.
        message: String,
    },

    /// A feed read was rejected by the backend's security rules.
    #[error("Permission denied reading {path}")]
    PermissionDenied {
        /// Document path that was rejected.
        path: String,
    },
}

impl SessionError {
    /// Returns `true` for fatal configuration errors.
    ///
    /// # Examples
    ///
    /// ```
    /// # use taskfair_session::SessionError;
    /// assert!(SessionError::ServicesUnavailable.is_configuration_error());
    /// ```
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(self, Self::ServicesUnavailable)
    }

    /// Returns `true` for non-fatal subscription errors.
    ///
    /// # Examples
    ///
    /// ```
    /// # use taskfair_session::SessionError;
    /// let err = SessionError::PermissionDenied { path: "roles_admin/u1".into() };
    /// assert!(err.is_subscription_error());
    /// ```
    #[must_use]
    pub const fn is_subscription_error(&self) -> bool {
        !self.is_configuration_error()
    }
}
