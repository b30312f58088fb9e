//! Error types shared by every actor kind.

use std::io;

/// Boxed error produced by domain hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures surfaced by the actor framework.
///
/// Misuse that has an obvious idempotent meaning (registering twice,
/// quitting twice) is never reported here.
#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    /// `start()` was called on an actor that is not in the created state.
    #[error("actor `{0}` has already been started")]
    AlreadyStarted(String),

    /// The OS refused to spawn the worker thread.
    #[error("failed to spawn thread for actor `{name}`")]
    Spawn {
        /// Actor name.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The receiving side of the mailbox no longer exists.
    #[error("mailbox of actor `{0}` is closed")]
    MailboxClosed(String),

    /// A domain hook returned an error and the actor stopped.
    #[error("actor `{name}` stopped with an error: {source}")]
    Reactor {
        /// Actor name.
        name: String,
        /// Error returned by `react` or `run_pre`.
        #[source]
        source: BoxError,
    },

    /// The worker thread panicked.
    #[error("actor `{0}` panicked")]
    Panicked(String),

    /// The host event loop failed.
    #[error("host loop of actor `{name}` failed: {source}")]
    Host {
        /// Actor name.
        name: String,
        /// Error reported by the host.
        #[source]
        source: BoxError,
    },

    /// An actor with the same name is already part of the group.
    #[error("an actor named `{0}` already exists")]
    DuplicateName(String),
}

impl ActorError {
    pub(crate) fn reactor(name: &str, source: anyhow::Error) -> Self {
        Self::Reactor {
            name: name.to_string(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reactor_error_keeps_source() {
        let err = ActorError::reactor("Beeper", anyhow::anyhow!("speaker unplugged"));
        assert_eq!(
            err.to_string(),
            "actor `Beeper` stopped with an error: speaker unplugged"
        );
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("speaker unplugged"));
    }
}
