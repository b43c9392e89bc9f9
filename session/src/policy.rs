//! Admin determination policy.
//!
//! The source of admin truth is the **existence of the marker document**
//! at the per-identity admin path. The `role` field on the profile
//! document is informational only and is deliberately not consulted:
//! mixing both sources produces races where the UI briefly renders the
//! wrong privilege level depending on which subscription resolves first.
//!
//! The policy is a pure function kept outside the subscription plumbing
//! so it is independently testable.

use crate::state::{AdminMarker, Profile};

/// Decide admin status from the delivered documents.
///
/// Returns `true` iff the admin marker document exists. The profile is
/// accepted so every input to the decision is visible at the call site,
/// but it does not participate in the result.
///
/// # Examples
///
/// ```
/// # use taskfair_session::policy::is_admin;
/// assert!(!is_admin(None, None));
/// ```
#[must_use]
pub const fn is_admin(_profile: Option<&Profile>, marker: Option<&AdminMarker>) -> bool {
    marker.is_some()
}
