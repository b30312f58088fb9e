//! Signal types for actor communication.
//!
//! A [`Signal`] is the only application-level message in the system. What
//! travels through a mailbox is an [`Envelope`], which additionally carries
//! the internal wake request used during shutdown.

use std::sync::Arc;

/// An immutable, named message.
///
/// Many signals share a name; the name is what the
/// [`Registry`](crate::Registry) routes on. `sender` lets recipients tell
/// apart several producers of the same name, and `target` is an optional
/// addressee that only the receiving actor's own logic interprets.
///
/// The payload type `T` belongs to the application and is never inspected
/// by the framework.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal<T> {
    name: String,
    sender: String,
    target: Option<String>,
    data: T,
}

impl<T> Signal<T> {
    /// Create a signal with no specific addressee.
    pub fn new(name: impl Into<String>, sender: impl Into<String>, data: T) -> Self {
        Self {
            name: name.into(),
            sender: sender.into(),
            target: None,
            data,
        }
    }

    /// Set the informational addressee.
    #[must_use]
    pub fn to(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Event class this signal belongs to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the originating actor.
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Intended addressee, if any.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Application payload.
    pub const fn data(&self) -> &T {
        &self.data
    }

    /// Whether this signal is addressed to `actor`, or to nobody in particular.
    pub fn is_for(&self, actor: &str) -> bool {
        self.target.as_deref().map_or(true, |target| target == actor)
    }
}

/// What a mailbox holds.
#[derive(Debug)]
pub enum Envelope<T> {
    /// An application signal, shared between every subscriber it was sent to.
    Signal(Arc<Signal<T>>),
    /// Request to check whether the actor should stop.
    Wake,
}

impl<T> Clone for Envelope<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Signal(signal) => Self::Signal(Arc::clone(signal)),
            Self::Wake => Self::Wake,
        }
    }
}
