//! # Taskfair Session
//!
//! Session aggregation for the Taskfair service marketplace.
//!
//! This crate presents a single consistent, reactive snapshot of "who is
//! signed in, what is their profile, are they an admin, are we still
//! determining this" to the rest of the application, built from three
//! independent asynchronous event sources:
//!
//! 1. the external identity provider's auth-state stream,
//! 2. the profile document feed (keyed by identity id),
//! 3. the admin marker document feed (keyed by identity id).
//!
//! ## Architecture
//!
//! The aggregator is a pure reducer driven by a store runtime:
//!
//! ```text
//! Action → Reducer → (State, Effects) → Effect Execution → More Actions
//! ```
//!
//! Subscriptions are stream effects under cancellation scopes; adopting a
//! new identity cancels the superseded generation's feeds, and a
//! generation tag on every feed event discards stale deliveries that were
//! already queued.
//!
//! ## Example
//!
//! ```rust,ignore
//! use taskfair_session::*;
//!
//! let env = SessionEnvironment::new(identity, profiles, admin_markers, clock);
//! let context = SessionContext::start(env);
//!
//! // Lightweight gate for any page:
//! let view = context.identity_view();
//! if view.is_loading { /* render spinner */ }
//!
//! // Full view for pages that need profile/admin and service handles:
//! let full = context.full_view()?;
//! if full.is_admin { /* render admin dashboard */ }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

// Public modules
pub mod actions;
pub mod config;
pub mod context;
pub mod environment;
pub mod error;
pub mod policy;
pub mod providers;
pub mod reducer;
pub mod state;
pub mod watcher;

#[cfg(feature = "test-utils")]
pub mod mocks;

// Re-export main types for convenience
pub use actions::{FeedEvent, SessionAction};
pub use config::SessionConfig;
pub use context::{FullSessionView, IdentityView, SessionContext};
pub use environment::SessionEnvironment;
pub use error::{Result, SessionError};
pub use state::{AdminMarker, Identity, Profile, Role, SessionPhase, SessionState, UserId};
pub use watcher::{SessionHandle, SessionWatcher};
