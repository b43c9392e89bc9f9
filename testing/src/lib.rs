//! # Taskfair Testing
//!
//! Testing utilities for the Taskfair session architecture.
//!
//! Provides the [`ReducerTest`] fluent harness for testing reducers with
//! Given-When-Then syntax, and effect assertions aware of subscription
//! streams and cancellation scopes.


pub use reducer_test::{assertions, ReducerTest};
