//! GuiReactor: an actor that lives on the host UI thread.
//!
//! UI toolkits want every widget mutation on one designated thread, so this
//! actor never blocks and never spawns. `start()` hands control to the
//! host's event loop and, on every tick, drains whatever is queued in the
//! mailbox. Worker actors keep running freely on their own threads while
//! everything UI-visible funnels through this one place.

use super::behavior::{Context, React};
use super::mailbox::{mailbox, Addr, Mailbox, Recipient};
use super::registry::Registry;
use super::signal::Envelope;
use super::{Actor, ActorState};
use crate::error::ActorError;
use crate::host::EventLoop;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for a cooperative actor.
#[derive(Debug, Clone)]
pub struct GuiConfig {
    /// Time between mailbox drains.
    pub update_interval: Duration,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            update_interval: Duration::from_millis(10),
        }
    }
}

/// Stops a running [`GuiReactor`] from a UI callback or another thread.
///
/// The loop notices the request on its next tick.
#[derive(Debug, Clone)]
pub struct QuitHandle {
    quit: Arc<AtomicBool>,
}

impl QuitHandle {
    /// Ask the UI loop to stop.
    pub fn quit(&self) {
        self.quit.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested.
    pub fn is_requested(&self) -> bool {
        self.quit.load(Ordering::SeqCst)
    }
}

/// A named actor polled by a host event loop.
pub struct GuiReactor<T, B, L> {
    /// Receiving side; dropped once the actor stops so senders see it closed.
    mailbox: Option<Mailbox<T>>,
    behavior: B,
    host: L,
    config: GuiConfig,
    ctx: Context<T>,
    quit: Arc<AtomicBool>,
    state: ActorState,
}

impl<T, B, L> GuiReactor<T, B, L>
where
    B: React<T>,
    L: EventLoop,
{
    /// Create a cooperative actor with default configuration.
    pub fn new(name: impl Into<String>, behavior: B, registry: &Registry<T>, host: L) -> Self {
        Self::with_config(name, behavior, registry, host, GuiConfig::default())
    }

    /// Create a cooperative actor with custom configuration.
    pub fn with_config(
        name: impl Into<String>,
        behavior: B,
        registry: &Registry<T>,
        host: L,
        config: GuiConfig,
    ) -> Self {
        let (addr, mailbox) = mailbox(name);
        let quit = Arc::new(AtomicBool::new(false));
        Self {
            mailbox: Some(mailbox),
            behavior,
            host,
            config,
            ctx: Context::new(addr, registry.clone(), Arc::clone(&quit)),
            quit,
            state: ActorState::Created,
        }
    }

    /// Name given at construction.
    pub fn name(&self) -> &str {
        self.ctx.name()
    }

    /// Address of this actor's mailbox.
    pub const fn addr(&self) -> &Addr<T> {
        self.ctx.addr()
    }

    /// Handle that stops the loop from elsewhere.
    pub fn quit_handle(&self) -> QuitHandle {
        QuitHandle {
            quit: Arc::clone(&self.quit),
        }
    }

    /// The plugged-in behaviour.
    pub const fn behavior(&self) -> &B {
        &self.behavior
    }

    /// The plugged-in behaviour, mutably.
    pub fn behavior_mut(&mut self) -> &mut B {
        &mut self.behavior
    }

    /// The host loop.
    pub const fn host(&self) -> &L {
        &self.host
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ActorState {
        match self.state {
            ActorState::Running if self.quit.load(Ordering::SeqCst) => ActorState::QuitRequested,
            state => state,
        }
    }

    /// Run the actor on the calling thread until the UI loop stops.
    ///
    /// Runs the pre-hook, reacts to everything already queued, then lets the
    /// host call back every `update_interval`. Returns once the loop has
    /// stopped and the post-hook has run.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::AlreadyStarted`] unless freshly created,
    /// [`ActorError::Reactor`] if a hook failed (the post-hook is skipped),
    /// or [`ActorError::Host`] if the host loop failed.
    pub fn start(&mut self) -> Result<(), ActorError> {
        let (ActorState::Created, Some(mailbox)) = (self.state, self.mailbox.take()) else {
            return Err(ActorError::AlreadyStarted(self.name().to_string()));
        };
        self.state = ActorState::Running;
        tracing::debug!(
            actor = self.name(),
            interval = ?self.config.update_interval,
            "ui loop starting"
        );

        let Self {
            behavior,
            host,
            config,
            ctx,
            state,
            ..
        } = self;

        if let Err(source) = behavior.run_pre(ctx) {
            *state = ActorState::Stopped;
            tracing::error!(actor = ctx.name(), error = ?source, "pre-hook failed");
            return Err(ActorError::reactor(ctx.name(), source));
        }

        let mut failure = None;
        let mut tick = || {
            if let Err(e) = Self::react_all(&mailbox, behavior, ctx) {
                failure = Some(e);
                return ControlFlow::Break(());
            }
            if ctx.will_quit() {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        };

        let hosted = match tick() {
            ControlFlow::Break(()) => Ok(()),
            ControlFlow::Continue(()) => host.run(config.update_interval, &mut tick),
        };
        *state = ActorState::Stopped;
        drop(mailbox);

        if let Some(source) = failure {
            tracing::error!(actor = ctx.name(), error = ?source, "ui actor returned error; stopping");
            return Err(ActorError::reactor(ctx.name(), source));
        }
        if let Err(source) = hosted {
            tracing::error!(actor = ctx.name(), error = ?source, "host loop failed");
            return Err(ActorError::Host {
                name: ctx.name().to_string(),
                source: source.into(),
            });
        }

        behavior.run_post(ctx);
        tracing::debug!(actor = ctx.name(), "ui loop stopped");
        Ok(())
    }

    /// Request the UI loop to stop.
    ///
    /// A no-op once the loop has ended; before `start()` it retires the
    /// actor without running any hook.
    pub fn quit(&mut self) {
        self.quit.store(true, Ordering::SeqCst);
        if self.state == ActorState::Created {
            tracing::debug!(actor = self.name(), "quit before start");
            self.state = ActorState::Stopped;
            self.mailbox = None;
        }
    }

    /// React to every envelope queued when the tick began, in FIFO order.
    fn react_all(mailbox: &Mailbox<T>, behavior: &mut B, ctx: &mut Context<T>) -> anyhow::Result<()> {
        for envelope in mailbox.drain() {
            match envelope {
                Envelope::Signal(signal) => {
                    tracing::trace!(actor = ctx.name(), signal = signal.name(), "reacting");
                    behavior.react(signal, ctx)?;
                }
                Envelope::Wake => ctx.stop(),
            }
            behavior.received_done(ctx);
        }
        Ok(())
    }
}

impl<T, B, L> Recipient<T> for GuiReactor<T, B, L> {
    fn addr(&self) -> &Addr<T> {
        self.ctx.addr()
    }
}

impl<T, B, L> Actor<T> for GuiReactor<T, B, L>
where
    T: 'static,
    B: React<T>,
    L: EventLoop,
{
    fn start(&mut self) -> Result<(), ActorError> {
        Self::start(self)
    }

    fn quit(&mut self) -> Result<(), ActorError> {
        Self::quit(self);
        Ok(())
    }

    fn state(&self) -> ActorState {
        Self::state(self)
    }
}
