//! Actor Model: message-passing concurrency without shared mutable state.
//!
//! Two kinds of actors share one contract ([`Actor`]):
//! - **Reactor**: owns a dedicated OS thread that blocks on its mailbox
//! - **GuiReactor**: runs on the host UI thread and drains its mailbox on
//!   every tick of the host event loop
//!
//! Producers never address actors directly. They broadcast named
//! [`Signal`]s through a [`Registry`], which enqueues a shared copy into the
//! mailbox of every actor subscribed to that name.
//!
//! # Architecture
//!
//! ```text
//!                     broadcast(Signal "Floor")
//! ┌──────────────┐ ─────────────────────────▶ ┌──────────────┐
//! │   Monitor    │                            │   Registry   │
//! │   (thread)   │                            │ name → addrs │
//! └──────────────┘                            └──────────────┘
//!                                        send │            │ send
//!                                             ▼            ▼
//!                                    ┌──────────────┐ ┌──────────────┐
//!                                    │  Filtered    │ │     GUI      │
//!                                    │  (thread,    │ │ (UI thread,  │
//!                                    │   blocking)  │ │  per tick)   │
//!                                    └──────────────┘ └──────────────┘
//! ```

mod behavior;
mod group;
mod gui;
mod mailbox;
mod reactor;
mod registry;
mod signal;

pub use behavior::{Context, React};
pub use group::ActorGroup;
pub use gui::{GuiConfig, GuiReactor, QuitHandle};
pub use mailbox::{mailbox, Addr, Mailbox, Recipient};
pub use reactor::{Reactor, ReactorConfig};
pub use registry::Registry;
pub use signal::{Envelope, Signal};

use crate::error::ActorError;

/// Lifecycle of an actor.
///
/// `Created → Running → QuitRequested → Stopped`; quitting an actor that was
/// never started moves it straight to `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorState {
    /// Built but not started.
    Created,
    /// Processing signals.
    Running,
    /// Asked to stop; finishing the current iteration.
    QuitRequested,
    /// No longer processing signals.
    Stopped,
}

/// The contract shared by worker and cooperative actors.
///
/// The two implementations differ in scheduling: [`Reactor::start`]
/// returns immediately, while [`GuiReactor::start`] blocks the calling
/// thread for the lifetime of the host event loop.
pub trait Actor<T: 'static>: Recipient<T> {
    /// Name given at construction, unique within a run.
    fn name(&self) -> &str {
        self.addr().name()
    }

    /// Begin processing signals.
    ///
    /// # Errors
    ///
    /// Fails if the actor was already started or could not be scheduled.
    fn start(&mut self) -> Result<(), ActorError>;

    /// Stop processing signals. Idempotent.
    ///
    /// # Errors
    ///
    /// Reports how the actor ended the first time it is stopped.
    fn quit(&mut self) -> Result<(), ActorError>;

    /// Current lifecycle state.
    fn state(&self) -> ActorState;

    /// Enqueue a signal directly, bypassing the registry.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::MailboxClosed`] if the actor has been torn down.
    fn send(&self, signal: Signal<T>) -> Result<(), ActorError> {
        self.addr().send(signal)
    }
}
