//! Per-actor inbound queues.
//!
//! A mailbox is split in two halves: any number of [`Addr`] clones may
//! enqueue from any thread, while the single [`Mailbox`] is owned by the
//! actor's own loop and is the only place envelopes are dequeued.

use super::signal::{Envelope, Signal};
use crate::error::ActorError;
use crossbeam_channel::{unbounded, Receiver, RecvError, Sender};
use std::fmt;
use std::sync::Arc;

/// Create an unbounded mailbox for the actor called `name`.
pub fn mailbox<T>(name: impl Into<String>) -> (Addr<T>, Mailbox<T>) {
    let name: Arc<str> = Arc::from(name.into());
    let (tx, rx) = unbounded();
    (
        Addr {
            name: Arc::clone(&name),
            tx,
        },
        Mailbox { name, rx },
    )
}

/// Sending half of an actor's mailbox.
pub struct Addr<T> {
    name: Arc<str>,
    tx: Sender<Envelope<T>>,
}

// Manual impl: `T` does not need to be `Clone`.
impl<T> Clone for Addr<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            tx: self.tx.clone(),
        }
    }
}

impl<T> fmt::Debug for Addr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Addr")
            .field("name", &self.name)
            .field("pending", &self.tx.len())
            .finish()
    }
}

impl<T> Addr<T> {
    /// Name of the actor owning the mailbox.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enqueue a signal. Never blocks.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::MailboxClosed`] if the actor has been torn down.
    pub fn send(&self, signal: Signal<T>) -> Result<(), ActorError> {
        self.send_shared(Arc::new(signal))
    }

    /// Enqueue a signal that may already be shared with other mailboxes.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::MailboxClosed`] if the actor has been torn down.
    pub fn send_shared(&self, signal: Arc<Signal<T>>) -> Result<(), ActorError> {
        self.deliver(Envelope::Signal(signal))
    }

    /// Ask the owning actor to check whether it should stop.
    ///
    /// A worker that dequeues a wake request stops after the current
    /// iteration, exactly as if its handle had asked it to quit.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::MailboxClosed`] if the actor has been torn down.
    pub fn wake(&self) -> Result<(), ActorError> {
        self.deliver(Envelope::Wake)
    }

    /// Number of envelopes waiting to be processed.
    pub fn pending(&self) -> usize {
        self.tx.len()
    }

    /// Whether both addresses point at the same mailbox.
    pub fn same_mailbox(&self, other: &Self) -> bool {
        self.tx.same_channel(&other.tx)
    }

    fn deliver(&self, envelope: Envelope<T>) -> Result<(), ActorError> {
        self.tx
            .send(envelope)
            .map_err(|_| ActorError::MailboxClosed(self.name.to_string()))
    }
}

/// Receiving half of an actor's mailbox.
pub struct Mailbox<T> {
    name: Arc<str>,
    rx: Receiver<Envelope<T>>,
}

impl<T> Mailbox<T> {
    /// Name of the owning actor.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Block until an envelope is available and return it (FIFO).
    ///
    /// A mailbox whose every address is gone can never receive again, so
    /// that case is reported as [`Envelope::Wake`].
    pub fn receive(&self) -> Envelope<T> {
        match self.rx.recv() {
            Ok(envelope) => envelope,
            Err(RecvError) => Envelope::Wake,
        }
    }

    /// Take every envelope queued at the moment of the call, without blocking.
    ///
    /// Envelopes that arrive while the batch is being taken wait for the
    /// next drain, so one call is bounded by the depth observed on entry.
    pub fn drain(&self) -> Vec<Envelope<T>> {
        let depth = self.rx.len();
        self.rx.try_iter().take(depth).collect()
    }

    /// Number of envelopes waiting to be processed.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Check if the mailbox is empty.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

/// Anything that can be addressed through a mailbox.
pub trait Recipient<T> {
    /// The address signals are delivered to.
    fn addr(&self) -> &Addr<T>;
}

impl<T> Recipient<T> for Addr<T> {
    fn addr(&self) -> &Addr<T> {
        self
    }
}
