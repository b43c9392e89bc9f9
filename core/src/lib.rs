//! # Taskfair Core
//!
//! Core traits and types for the Taskfair session architecture.
//!
//! This crate provides the fundamental abstractions used by the session
//! layer of the Taskfair service marketplace:
//!
//! - **State**: owned, `Clone`-able domain state for a feature
//! - **Action**: all possible inputs to a reducer (commands and events
//!   produced by subscriptions)
//! - **Reducer**: pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: side-effect descriptions (values, not execution), including
//!   long-lived subscription streams and scoped cancellation
//! - **Clock**: injected time source for testability
//!
//! ## Architecture Principles
//!
//! - Functional core, imperative shell
//! - Unidirectional data flow
//! - Explicit effects (no hidden I/O in reducers)
//! - Dependency injection via the Environment parameter
//!
//! ## Example
//!
//! ```ignore
//! use taskfair_core::{effect::Effect, reducer::Reducer};
//!
//! impl Reducer for SessionReducer {
//!     type State = SessionState;
//!     type Action = SessionAction;
//!     type Environment = SessionEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut SessionState,
//!         action: SessionAction,
//!         env: &SessionEnvironment,
//!     ) -> SmallVec<[Effect<SessionAction>; 4]> {
//!         // Pure transitions; subscriptions are returned as Effect values.
//!         smallvec![]
//!     }
//! }
//! ```

// Re-export commonly used types so downstream crates share one version.
pub use chrono::{DateTime, Utc};
pub use smallvec::{smallvec, SmallVec};

pub mod clock;
pub mod effect;
pub mod reducer;

pub use clock::Clock;
pub use effect::{Effect, EffectId};
pub use reducer::Reducer;
