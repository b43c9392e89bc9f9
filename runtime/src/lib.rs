//! # Taskfair Runtime
//!
//! Runtime implementation for the Taskfair session architecture.
//!
//! This crate provides the [`Store`] runtime that coordinates reducer
//! execution and effect handling:
//!
//! - **Store**: owns state, serializes reductions, and executes effects
//! - **Effect executor**: runs futures, delays, and long-lived subscription
//!   streams in spawned tasks, feeding produced actions back into the reducer
//! - **Cancellation scopes**: effects registered under an
//!   [`EffectId`](taskfair_core::effect::EffectId) are aborted when a
//!   matching `Effect::Cancel` is reduced
//! - **State observation**: consumers read the latest state synchronously or
//!   await changes through a `tokio::sync::watch` channel
//!
//! ## Example
//!
//! ```ignore
//! use taskfair_runtime::Store;
//!
//! let store = Store::spawn(initial_state, my_reducer, environment);
//!
//! store.send(Action::Start)?;
//!
//! // Synchronous read of the latest published state.
//! let snapshot = store.state();
//!
//! // Or await the next change.
//! let mut rx = store.subscribe();
//! rx.changed().await?;
//! ```

pub mod error;
pub mod store;

pub use error::StoreError;
pub use store::Store;
