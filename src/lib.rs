//! # Tether
//!
//! Threaded actors glued to a UI loop by named signals.
//!
//! Tether lets independent components (sensor monitors, motor drivers, a
//! beeper) run concurrently while a user interface stays responsive and
//! correct. Components never call each other; they broadcast named
//! [`Signal`]s through a [`Registry`], and every subscribed actor receives a
//! copy in its own mailbox.
//!
//! ## Core Concepts
//!
//! - **Reactor**: a worker actor on a dedicated OS thread, blocking on its mailbox
//! - **GuiReactor**: a cooperative actor drained on every tick of the host UI loop
//! - **Registry**: signal name to subscriber addresses, with broadcast fan-out
//! - **Host loop**: the UI thread's timer and input source ([`host::EventLoop`])
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tether::{Context, GuiReactor, React, Reactor, Registry, Signal, TickLoop};
//!
//! struct Beeper;
//!
//! impl React<String> for Beeper {
//!     fn react(&mut self, signal: Arc<Signal<String>>, _ctx: &mut Context<String>) -> anyhow::Result<()> {
//!         println!("beep ({})", signal.data());
//!         Ok(())
//!     }
//! }
//!
//! struct Display;
//!
//! impl React<String> for Display {
//!     fn react(&mut self, signal: Arc<Signal<String>>, ctx: &mut Context<String>) -> anyhow::Result<()> {
//!         println!("{} from {}", signal.data(), signal.sender());
//!         ctx.stop();
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> Result<(), tether::ActorError> {
//! let registry = Registry::new();
//! let mut beeper = Reactor::new("Beeper", Beeper, &registry);
//! let mut gui = GuiReactor::new("GUI", Display, &registry, TickLoop::new());
//! registry.register("Beep", &beeper);
//! registry.register("Floor", &gui);
//!
//! beeper.start()?;
//! registry.broadcast(Signal::new("Beep", "GUI", "short".to_string()));
//! registry.broadcast(Signal::new("Floor", "Monitor", "(3, 4)".to_string()));
//! gui.start()?;
//! beeper.quit()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod error;
pub mod host;
pub mod telemetry;

// Re-exports for convenience
pub use actor::{
    Actor, ActorGroup, ActorState, Addr, Context, Envelope, GuiConfig, GuiReactor, Mailbox,
    QuitHandle, React, Reactor, ReactorConfig, Recipient, Registry, Signal,
};
pub use error::ActorError;
pub use host::{
    EventLoop, InputEvent, KeyCode, KeyModifiers, MouseButton, MouseEvent, TerminalConfig,
    TerminalLoop, TickLoop,
};
pub use telemetry::{init_tracing, LogConfig, LogFormat, LogTarget};
