//! Mock providers for testing.
//!
//! In-memory implementations of the provider traits. Each mock delivers
//! the initial event its trait contract requires and broadcasts later
//! emissions to every live subscription, mimicking a document database's
//! snapshot listeners.

mod admin;
mod feed;
mod identity;
mod profile;

pub use admin::MockAdminMarkerFeed;
pub use identity::MockIdentityStream;
pub use profile::MockProfileFeed;
