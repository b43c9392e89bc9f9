//! Error types for the Store runtime.

use thiserror::Error;

/// Errors that can occur during Store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Store is shutting down and not accepting new actions.
    ///
    /// Returned when `send()` is called after shutdown was initiated or
    /// after the store task exited.
    #[error("Store is shutting down")]
    ShutdownInProgress,

    /// State watch channel closed.
    ///
    /// The store task exited while a consumer was awaiting a state change.
    #[error("State channel closed")]
    ChannelClosed,
}
