//! Domain extension points and the per-actor runtime context.

use super::mailbox::Addr;
use super::registry::Registry;
use super::signal::Signal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Behaviour plugged into a [`Reactor`](crate::Reactor) or a
/// [`GuiReactor`](crate::GuiReactor).
///
/// All hooks run on the actor's own thread (the worker thread, or the UI
/// thread for the cooperative actor). Errors are not caught by the
/// framework: returning `Err` from `react` or `run_pre` stops the actor and
/// the error is reported by `quit()` or `start()` respectively.
pub trait React<T> {
    /// Handle one signal.
    ///
    /// # Errors
    ///
    /// Any error stops the actor.
    fn react(&mut self, signal: Arc<Signal<T>>, ctx: &mut Context<T>) -> anyhow::Result<()>;

    /// Runs once before the first signal is processed.
    ///
    /// # Errors
    ///
    /// An error stops the actor before it processes anything.
    fn run_pre(&mut self, _ctx: &mut Context<T>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs once after the loop has ended cleanly.
    fn run_post(&mut self, _ctx: &mut Context<T>) {}

    /// Runs after every dequeued envelope, including wake requests.
    fn received_done(&mut self, _ctx: &mut Context<T>) {}
}

/// Runtime context handed to every hook.
pub struct Context<T> {
    addr: Addr<T>,
    registry: Registry<T>,
    quit: Arc<AtomicBool>,
}

impl<T> Context<T> {
    pub(crate) fn new(addr: Addr<T>, registry: Registry<T>, quit: Arc<AtomicBool>) -> Self {
        Self {
            addr,
            registry,
            quit,
        }
    }

    /// Name of the actor this context belongs to.
    pub fn name(&self) -> &str {
        self.addr.name()
    }

    /// The actor's own address, for self-sends.
    pub const fn addr(&self) -> &Addr<T> {
        &self.addr
    }

    /// The registry this actor was built with.
    pub const fn registry(&self) -> &Registry<T> {
        &self.registry
    }

    /// Broadcast a signal with this actor as sender and no addressee.
    ///
    /// Returns the number of subscribers reached.
    pub fn broadcast(&self, name: impl Into<String>, data: T) -> usize {
        self.registry.broadcast(Signal::new(name, self.name(), data))
    }

    /// Broadcast a signal with this actor as sender, addressed to `target`.
    ///
    /// Routing is still by name; the target is for the receivers' logic.
    pub fn broadcast_to(&self, name: impl Into<String>, target: impl Into<String>, data: T) -> usize {
        self.registry
            .broadcast(Signal::new(name, self.name(), data).to(target))
    }

    /// Stop after the current iteration of the loop.
    pub fn stop(&mut self) {
        self.quit.store(true, Ordering::SeqCst);
    }

    /// Whether the actor has been asked to stop.
    pub fn will_quit(&self) -> bool {
        self.quit.load(Ordering::SeqCst)
    }
}
