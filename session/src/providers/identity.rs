//! Identity stream event type.

use crate::error::SessionError;
use crate::state::Identity;
use serde::{Deserialize, Serialize};

/// One event from the external identity provider's auth-state stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IdentityEvent {
    /// A subject is signed in.
    SignedIn(Identity),

    /// Nobody is signed in. Also the required initial event when no
    /// session exists.
    SignedOut,

    /// The stream itself failed.
    Failed(SessionError),
}
