//! Reactor: an actor backed by a dedicated OS thread.
//!
//! The thread runs the pre-hook, then blocks on its mailbox and reacts to
//! each signal in arrival order, then runs the post-hook. Shutdown is
//! cooperative: `quit()` raises a flag, enqueues a wake request so a parked
//! `receive()` returns, and joins the thread.

use super::behavior::{Context, React};
use super::mailbox::{mailbox, Addr, Mailbox, Recipient};
use super::registry::Registry;
use super::signal::Envelope;
use super::{Actor, ActorState};
use crate::error::ActorError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Configuration for a worker actor.
#[derive(Debug, Clone, Default)]
pub struct ReactorConfig {
    /// Stack size of the worker thread (platform default if `None`).
    pub stack_size: Option<usize>,
}

/// A named actor that reacts to signals on its own thread.
pub struct Reactor<T, B> {
    /// Address of this actor's mailbox.
    addr: Addr<T>,
    /// Receiving side, moved into the thread on start.
    mailbox: Option<Mailbox<T>>,
    /// Domain behaviour, moved into the thread on start.
    behavior: Option<B>,
    /// Registry handed to the behaviour's context.
    registry: Registry<T>,
    /// Thread configuration.
    config: ReactorConfig,
    /// Flag checked by the loop before every receive.
    quit: Arc<AtomicBool>,
    /// Set by the thread when it exits, even by panicking.
    finished: Arc<AtomicBool>,
    /// Handle to the worker thread.
    handle: Option<JoinHandle<anyhow::Result<()>>>,
    /// Whether the actor has been joined (or quit before starting).
    stopped: bool,
}

impl<T, B> Reactor<T, B>
where
    T: Send + Sync + 'static,
    B: React<T> + Send + 'static,
{
    /// Create a worker actor with default configuration.
    pub fn new(name: impl Into<String>, behavior: B, registry: &Registry<T>) -> Self {
        Self::with_config(name, behavior, registry, ReactorConfig::default())
    }

    /// Create a worker actor with custom configuration.
    pub fn with_config(
        name: impl Into<String>,
        behavior: B,
        registry: &Registry<T>,
        config: ReactorConfig,
    ) -> Self {
        let (addr, mailbox) = mailbox(name);
        Self {
            addr,
            mailbox: Some(mailbox),
            behavior: Some(behavior),
            registry: registry.clone(),
            config,
            quit: Arc::new(AtomicBool::new(false)),
            finished: Arc::new(AtomicBool::new(false)),
            handle: None,
            stopped: false,
        }
    }

    /// Name given at construction.
    pub fn name(&self) -> &str {
        self.addr.name()
    }

    /// Address of this actor's mailbox.
    pub const fn addr(&self) -> &Addr<T> {
        &self.addr
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ActorState {
        if self.stopped || self.finished.load(Ordering::SeqCst) {
            ActorState::Stopped
        } else if self.handle.is_none() {
            ActorState::Created
        } else if self.quit.load(Ordering::SeqCst) {
            ActorState::QuitRequested
        } else {
            ActorState::Running
        }
    }

    /// Whether the worker has been asked to stop.
    pub fn will_quit(&self) -> bool {
        self.quit.load(Ordering::SeqCst)
    }

    /// Spawn the worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::AlreadyStarted`] unless the actor is freshly
    /// created, or [`ActorError::Spawn`] if the OS refuses the thread.
    pub fn start(&mut self) -> Result<(), ActorError> {
        if self.stopped || self.handle.is_some() {
            return Err(ActorError::AlreadyStarted(self.name().to_string()));
        }
        let (Some(mailbox), Some(behavior)) = (self.mailbox.take(), self.behavior.take()) else {
            return Err(ActorError::AlreadyStarted(self.name().to_string()));
        };

        let ctx = Context::new(
            self.addr.clone(),
            self.registry.clone(),
            Arc::clone(&self.quit),
        );
        let finished = FinishedGuard(Arc::clone(&self.finished));

        let mut builder = thread::Builder::new().name(self.name().to_string());
        if let Some(size) = self.config.stack_size {
            builder = builder.stack_size(size);
        }

        let handle = builder
            .spawn(move || {
                let _finished = finished;
                Self::run_loop(behavior, &mailbox, ctx)
            })
            .map_err(|source| {
                self.stopped = true;
                ActorError::Spawn {
                    name: self.addr.name().to_string(),
                    source,
                }
            })?;

        tracing::debug!(actor = self.name(), "worker started");
        self.handle = Some(handle);
        Ok(())
    }

    /// Ask the worker to stop and wait for its thread to exit.
    ///
    /// Safe to call before `start()` and any number of times; only the
    /// first call after `start()` reports how the worker ended.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::Reactor`] if a hook returned an error, or
    /// [`ActorError::Panicked`] if the thread panicked.
    pub fn quit(&mut self) -> Result<(), ActorError> {
        self.quit.store(true, Ordering::SeqCst);

        let Some(handle) = self.handle.take() else {
            if !self.stopped {
                tracing::debug!(actor = self.name(), "quit before start");
                self.stopped = true;
                // Senders must see the mailbox closed, not queue forever.
                self.mailbox = None;
                self.behavior = None;
            }
            return Ok(());
        };

        // Fails only when the thread has already exited and dropped its mailbox.
        let _ = self.addr.wake();

        tracing::debug!(actor = self.name(), "waiting for worker thread");
        let outcome = handle.join();
        self.stopped = true;

        match outcome {
            Ok(Ok(())) => {
                tracing::debug!(actor = self.name(), "worker stopped");
                Ok(())
            }
            Ok(Err(source)) => Err(ActorError::reactor(self.name(), source)),
            Err(_) => Err(ActorError::Panicked(self.name().to_string())),
        }
    }

    /// Main worker loop.
    fn run_loop(mut behavior: B, mailbox: &Mailbox<T>, mut ctx: Context<T>) -> anyhow::Result<()> {
        let result = (|| -> anyhow::Result<()> {
            behavior.run_pre(&mut ctx)?;
            while !ctx.will_quit() {
                match mailbox.receive() {
                    Envelope::Signal(signal) => {
                        tracing::trace!(actor = ctx.name(), signal = signal.name(), "reacting");
                        behavior.react(signal, &mut ctx)?;
                    }
                    Envelope::Wake => ctx.stop(),
                }
                behavior.received_done(&mut ctx);
            }
            behavior.run_post(&mut ctx);
            Ok(())
        })();

        if let Err(e) = &result {
            tracing::error!(actor = ctx.name(), error = ?e, "worker returned error; stopping");
        }
        result
    }
}

impl<T, B> Recipient<T> for Reactor<T, B> {
    fn addr(&self) -> &Addr<T> {
        &self.addr
    }
}

impl<T, B> Actor<T> for Reactor<T, B>
where
    T: Send + Sync + 'static,
    B: React<T> + Send + 'static,
{
    fn start(&mut self) -> Result<(), ActorError> {
        Self::start(self)
    }

    fn quit(&mut self) -> Result<(), ActorError> {
        Self::quit(self)
    }

    fn state(&self) -> ActorState {
        Self::state(self)
    }
}

impl<T, B> Drop for Reactor<T, B> {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.quit.store(true, Ordering::SeqCst);
        let _ = self.addr.wake();
        if handle.join().is_err() {
            tracing::warn!(actor = self.addr.name(), "worker panicked before drop");
        }
    }
}

/// Marks the worker finished when the thread unwinds or returns.
struct FinishedGuard(Arc<AtomicBool>);

impl Drop for FinishedGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::signal::Signal;
    use crossbeam_channel::{unbounded, Receiver, Sender};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    const TIMEOUT: Duration = Duration::from_secs(2);

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Pre,
        Seen(i32),
        Done,
        Post,
    }

    /// Reports every hook to a test channel.
    struct Recorder {
        events: Sender<Event>,
        fail_on: Option<i32>,
        panic_on: Option<i32>,
    }

    impl Recorder {
        fn new() -> (Self, Receiver<Event>) {
            let (events, rx) = unbounded();
            (
                Self {
                    events,
                    fail_on: None,
                    panic_on: None,
                },
                rx,
            )
        }
    }

    impl React<i32> for Recorder {
        fn react(&mut self, signal: Arc<Signal<i32>>, ctx: &mut Context<i32>) -> anyhow::Result<()> {
            let value = *signal.data();
            if self.fail_on == Some(value) {
                anyhow::bail!("{} cannot handle {value}", ctx.name());
            }
            if self.panic_on == Some(value) {
                panic!("recorder panicked on {value}");
            }
            let _ = self.events.send(Event::Seen(value));
            Ok(())
        }

        fn run_pre(&mut self, _ctx: &mut Context<i32>) -> anyhow::Result<()> {
            let _ = self.events.send(Event::Pre);
            Ok(())
        }

        fn run_post(&mut self, _ctx: &mut Context<i32>) {
            let _ = self.events.send(Event::Post);
        }

        fn received_done(&mut self, _ctx: &mut Context<i32>) {
            let _ = self.events.send(Event::Done);
        }
    }

    /// Wait for the worker thread to exit on its own.
    fn wait_stopped<B>(worker: &Reactor<i32, B>)
    where
        B: React<i32> + Send + 'static,
    {
        let deadline = Instant::now() + TIMEOUT;
        while worker.state() != ActorState::Stopped {
            assert!(Instant::now() < deadline, "worker never stopped");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn seen(rx: &Receiver<Event>, count: usize) -> Vec<i32> {
        let mut values = Vec::new();
        while values.len() < count {
            if let Event::Seen(value) = rx.recv_timeout(TIMEOUT).expect("worker went quiet") {
                values.push(value);
            }
        }
        values
    }

    #[test]
    fn test_reacts_in_fifo_order() {
        let registry = Registry::new();
        let (recorder, rx) = Recorder::new();
        let mut worker = Reactor::new("Worker", recorder, &registry);
        registry.register("Tick", &worker);
        worker.start().unwrap();

        for value in [1, 2, 3] {
            assert_eq!(registry.broadcast(Signal::new("Tick", "test", value)), 1);
        }
        assert_eq!(seen(&rx, 3), vec![1, 2, 3]);
        worker.quit().unwrap();
    }

    #[test]
    fn test_hook_order() {
        let registry = Registry::new();
        let (recorder, rx) = Recorder::new();
        let mut worker = Reactor::new("Worker", recorder, &registry);
        worker.start().unwrap();
        worker.send_direct(5);
        assert_eq!(seen(&rx, 1), vec![5]);
        worker.quit().unwrap();

        // The wake may or may not be dequeued, depending on when the flag is seen.
        let events: Vec<Event> = rx.try_iter().collect();
        assert_eq!(events.first(), Some(&Event::Done));
        assert_eq!(events.last(), Some(&Event::Post));
    }

    #[test]
    fn test_start_then_quit_is_bounded() {
        let registry = Registry::new();
        let (recorder, rx) = Recorder::new();
        let mut worker = Reactor::new("Idle", recorder, &registry);
        assert_eq!(worker.state(), ActorState::Created);

        worker.start().unwrap();
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), Event::Pre);
        assert_eq!(worker.state(), ActorState::Running);

        let started = Instant::now();
        worker.quit().unwrap();
        assert!(started.elapsed() < TIMEOUT);
        assert_eq!(worker.state(), ActorState::Stopped);
    }

    #[test]
    fn test_quit_is_idempotent() {
        let registry = Registry::new();
        let (recorder, _rx) = Recorder::new();
        let mut worker = Reactor::new("Twice", recorder, &registry);
        worker.start().unwrap();
        worker.quit().unwrap();

        let started = Instant::now();
        worker.quit().unwrap();
        worker.quit().unwrap();
        assert!(started.elapsed() < TIMEOUT);
    }

    #[test]
    fn test_quit_before_start() {
        let registry = Registry::new();
        let (recorder, rx) = Recorder::new();
        let mut worker = Reactor::new("Never", recorder, &registry);
        worker.quit().unwrap();
        assert_eq!(worker.state(), ActorState::Stopped);
        assert!(matches!(worker.start(), Err(ActorError::AlreadyStarted(_))));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_quit_before_start_closes_mailbox() {
        let registry = Registry::new();
        let (recorder, _rx) = Recorder::new();
        let mut worker = Reactor::new("Never", recorder, &registry);
        registry.register("Tick", &worker);
        worker.quit().unwrap();

        assert_eq!(registry.broadcast(Signal::new("Tick", "test", 1)), 0);
        assert!(!registry.is_registered("Tick", "Never"));
        assert_eq!(worker.addr().pending(), 0);
    }

    #[test]
    fn test_start_twice_fails() {
        let registry = Registry::new();
        let (recorder, _rx) = Recorder::new();
        let mut worker = Reactor::new("Eager", recorder, &registry);
        worker.start().unwrap();
        let err = worker.start().unwrap_err();
        assert!(matches!(err, ActorError::AlreadyStarted(name) if name == "Eager"));
        worker.quit().unwrap();
    }

    #[test]
    fn test_wake_stops_worker() {
        let registry = Registry::new();
        let (recorder, rx) = Recorder::new();
        let mut worker = Reactor::new("Woken", recorder, &registry);
        worker.start().unwrap();
        worker.addr().wake().unwrap();

        // The worker exits on its own; Post proves the loop ended cleanly.
        loop {
            if rx.recv_timeout(TIMEOUT).unwrap() == Event::Post {
                break;
            }
        }
        worker.quit().unwrap();
        assert_eq!(worker.state(), ActorState::Stopped);
    }

    #[test]
    fn test_react_error_is_reported_by_quit() {
        let registry = Registry::new();
        let (mut recorder, rx) = Recorder::new();
        recorder.fail_on = Some(13);
        let mut worker = Reactor::new("Fragile", recorder, &registry);
        worker.start().unwrap();
        worker.send_direct(13);
        worker.send_direct(14);
        wait_stopped(&worker);

        let err = worker.quit().unwrap_err();
        assert!(matches!(err, ActorError::Reactor { ref name, .. } if name == "Fragile"));
        assert!(err.to_string().contains("cannot handle 13"));
        // The loop ended at 13 without running the post-hook.
        assert!(!rx.try_iter().any(|event| event == Event::Seen(14) || event == Event::Post));

        // Second quit is quiet.
        worker.quit().unwrap();
    }

    #[test]
    fn test_panic_is_reported_by_quit() {
        let registry = Registry::new();
        let (mut recorder, _rx) = Recorder::new();
        recorder.panic_on = Some(0);
        let mut worker = Reactor::new("Crashy", recorder, &registry);
        worker.start().unwrap();
        worker.send_direct(0);
        wait_stopped(&worker);

        let err = worker.quit().unwrap_err();
        assert!(matches!(err, ActorError::Panicked(name) if name == "Crashy"));
        assert_eq!(worker.state(), ActorState::Stopped);
    }

    #[test]
    fn test_stopped_worker_is_pruned_from_registry() {
        let registry = Registry::new();
        let (recorder, _rx) = Recorder::new();
        let mut worker = Reactor::new("Gone", recorder, &registry);
        registry.register("Tick", &worker);
        worker.start().unwrap();
        worker.quit().unwrap();

        assert_eq!(registry.broadcast(Signal::new("Tick", "test", 1)), 0);
        assert!(!registry.is_registered("Tick", "Gone"));
    }

    #[test]
    fn test_drop_joins_running_worker() {
        let registry = Registry::new();
        let (recorder, rx) = Recorder::new();
        let mut worker = Reactor::new("Dropped", recorder, &registry);
        worker.start().unwrap();
        drop(worker);
        assert!(rx.try_iter().any(|event| event == Event::Post));
    }

    #[test]
    fn test_beeper_scenario() {
        let registry = Registry::new();
        let (beeps, beep_rx) = unbounded();
        let (servo, servo_rx) = unbounded();

        struct Recorder(Sender<(u32, f64)>);
        impl React<(u32, f64)> for Recorder {
            fn react(
                &mut self,
                signal: Arc<Signal<(u32, f64)>>,
                _ctx: &mut Context<(u32, f64)>,
            ) -> anyhow::Result<()> {
                self.0.send(*signal.data())?;
                Ok(())
            }
        }

        let mut beeper = Reactor::new("Beeper", Recorder(beeps), &registry);
        let mut monitor = Reactor::new("Monitor", Recorder(servo), &registry);
        registry.register("Beep", &beeper);
        registry.register("Servo", &monitor);
        beeper.start().unwrap();
        monitor.start().unwrap();

        registry.broadcast(Signal::new("Beep", "UI", (40, 0.2)));
        registry.broadcast(Signal::new("Beep", "UI", (0, 0.1)));

        assert_eq!(beep_rx.recv_timeout(TIMEOUT).unwrap(), (40, 0.2));
        assert_eq!(beep_rx.recv_timeout(TIMEOUT).unwrap(), (0, 0.1));

        beeper.quit().unwrap();
        monitor.quit().unwrap();
        assert!(beep_rx.try_recv().is_err());
        assert!(servo_rx.try_recv().is_err());
    }

    impl<B> Reactor<i32, B> {
        fn send_direct(&self, value: i32) {
            self.addr.send(Signal::new("Direct", "test", value)).unwrap();
        }
    }
}
