//! Host event loops for the cooperative actor.
//!
//! A [`GuiReactor`](crate::GuiReactor) does not own a thread. It borrows
//! the host's single-threaded loop through [`EventLoop`], which provides
//! the two things the actor needs: a callback every `interval`, and a call
//! that blocks until the loop is told to stop.
//!
//! - [`TickLoop`]: headless fixed-rate loop on the calling thread
//! - [`TerminalLoop`]: crossterm-backed loop that also dispatches terminal input

mod input;
mod terminal;
mod tick;

pub use input::{InputEvent, KeyCode, KeyModifiers, MouseButton, MouseEvent};
pub use terminal::{TerminalConfig, TerminalLoop};
pub use tick::TickLoop;

use std::ops::ControlFlow;
use std::time::Duration;

/// A host loop that can drive periodic callbacks on the current thread.
pub trait EventLoop {
    /// Run the loop, calling `on_tick` every `interval`, until `on_tick`
    /// returns [`ControlFlow::Break`] or the host itself shuts down.
    ///
    /// # Errors
    ///
    /// Returns an error if the host fails (e.g. the terminal goes away).
    fn run(
        &mut self,
        interval: Duration,
        on_tick: &mut dyn FnMut() -> ControlFlow<()>,
    ) -> anyhow::Result<()>;
}

impl<L: EventLoop + ?Sized> EventLoop for &mut L {
    fn run(
        &mut self,
        interval: Duration,
        on_tick: &mut dyn FnMut() -> ControlFlow<()>,
    ) -> anyhow::Result<()> {
        (**self).run(interval, on_tick)
    }
}

impl<L: EventLoop + ?Sized> EventLoop for Box<L> {
    fn run(
        &mut self,
        interval: Duration,
        on_tick: &mut dyn FnMut() -> ControlFlow<()>,
    ) -> anyhow::Result<()> {
        (**self).run(interval, on_tick)
    }
}
