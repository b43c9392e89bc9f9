//! Session configuration.
//!
//! Collection names for the two per-identity document paths. Adapters
//! use these to address the backing store; the mocks use them to report
//! realistic paths in permission errors.

/// Session layer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Collection holding profile documents, keyed by identity id.
    pub profile_collection: String,

    /// Collection holding admin marker documents, keyed by identity id.
    pub admin_marker_collection: String,
}

impl SessionConfig {
    /// Create a configuration with the default collection names.
    #[must_use]
    pub fn new() -> Self {
        Self {
            profile_collection: "users".to_string(),
            admin_marker_collection: "roles_admin".to_string(),
        }
    }

    /// Set the profile collection name.
    #[must_use]
    pub fn with_profile_collection(mut self, name: impl Into<String>) -> Self {
        self.profile_collection = name.into();
        self
    }

    /// Set the admin marker collection name.
    #[must_use]
    pub fn with_admin_marker_collection(mut self, name: impl Into<String>) -> Self {
        self.admin_marker_collection = name.into();
        self
    }

    /// Document path for a user's profile.
    #[must_use]
    pub fn profile_path(&self, user: &crate::state::UserId) -> String {
        format!("{}/{}", self.profile_collection, user)
    }

    /// Document path for a user's admin marker.
    #[must_use]
    pub fn admin_marker_path(&self, user: &crate::state::UserId) -> String {
        format!("{}/{}", self.admin_marker_collection, user)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}
