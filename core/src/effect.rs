//! Side-effect descriptions.
//!
//! Effects are **values**, not execution. Reducers return effect
//! descriptions and the runtime `Store` interprets them: futures are
//! awaited, streams are driven for their lifetime, and cancellable
//! scopes are torn down when a matching [`Effect::Cancel`] arrives.

use futures::stream::BoxStream;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Identifier for a cancellable effect scope.
///
/// Scopes are keyed by a static label plus a numeric discriminant, which
/// lets a reducer cancel "the previous generation" of a subscription
/// without tracking task handles itself:
///
/// ```
/// use taskfair_core::effect::EffectId;
///
/// let old = EffectId::scoped("session-feeds", 6);
/// let new = EffectId::scoped("session-feeds", 7);
/// assert_ne!(old, new);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectId {
    label: &'static str,
    discriminant: u64,
}

impl EffectId {
    /// Create a scope identifier from a label and discriminant.
    #[must_use]
    pub const fn scoped(label: &'static str, discriminant: u64) -> Self {
        Self { label, discriminant }
    }

    /// The scope label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// The scope discriminant.
    #[must_use]
    pub const fn discriminant(&self) -> u64 {
        self.discriminant
    }
}

impl std::fmt::Display for EffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.label, self.discriminant)
    }
}

/// Effect type - describes a side effect to be executed by the runtime.
///
/// # Type Parameters
///
/// - `Action`: the action type effects can produce (feedback loop)
pub enum Effect<Action> {
    /// No-op effect.
    None,

    /// Run effects concurrently.
    Parallel(Vec<Effect<Action>>),

    /// Run effects in order.
    Sequential(Vec<Effect<Action>>),

    /// Delayed action (timeouts, retries).
    Delay {
        /// How long to wait.
        duration: Duration,
        /// Action to dispatch after the delay.
        action: Box<Action>,
    },

    /// Arbitrary async computation.
    ///
    /// If the future resolves to `Some(action)`, the action is fed back
    /// into the reducer.
    Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),

    /// Long-lived subscription.
    ///
    /// The runtime drives the stream until it ends or its enclosing
    /// cancellable scope is torn down; every item is fed back into the
    /// reducer as an action.
    Stream(BoxStream<'static, Action>),

    /// Effect that can be torn down later by [`Effect::Cancel`] with the
    /// same id.
    Cancellable {
        /// Scope identifier.
        id: EffectId,
        /// The effect to run under this scope.
        effect: Box<Effect<Action>>,
    },

    /// Tear down all running effects registered under `id`.
    ///
    /// Cancelling an unknown id is a no-op, so reducers may cancel
    /// unconditionally on every transition.
    Cancel(EffectId),
}

// Manual Debug implementation since Future/Stream don't implement Debug.
impl<Action> std::fmt::Debug for Effect<Action>
where
    Action: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::None => write!(f, "Effect::None"),
            Effect::Parallel(effects) => {
                f.debug_tuple("Effect::Parallel").field(effects).finish()
            },
            Effect::Sequential(effects) => {
                f.debug_tuple("Effect::Sequential").field(effects).finish()
            },
            Effect::Delay { duration, action } => f
                .debug_struct("Effect::Delay")
                .field("duration", duration)
                .field("action", action)
                .finish(),
            Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            Effect::Stream(_) => write!(f, "Effect::Stream(<stream>)"),
            Effect::Cancellable { id, effect } => f
                .debug_struct("Effect::Cancellable")
                .field("id", id)
                .field("effect", effect)
                .finish(),
            Effect::Cancel(id) => f.debug_tuple("Effect::Cancel").field(id).finish(),
        }
    }
}

impl<Action> Effect<Action> {
    /// Combine effects to run concurrently.
    #[must_use]
    pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
        Effect::Parallel(effects)
    }

    /// Chain effects to run in order.
    #[must_use]
    pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
        Effect::Sequential(effects)
    }

    /// Wrap this effect in a cancellable scope.
    #[must_use]
    pub fn cancellable(self, id: EffectId) -> Effect<Action> {
        Effect::Cancellable {
            id,
            effect: Box::new(self),
        }
    }

    /// Whether this effect (recursively) contains a cancellable scope
    /// with the given id.
    #[must_use]
    pub fn is_scoped_under(&self, id: EffectId) -> bool {
        match self {
            Effect::Cancellable { id: own, effect } => {
                *own == id || effect.is_scoped_under(id)
            },
            Effect::Parallel(effects) | Effect::Sequential(effects) => {
                effects.iter().any(|e| e.is_scoped_under(id))
            },
            _ => false,
        }
    }
}
