//! Terminal host loop backed by crossterm.
//!
//! Construction puts the terminal into raw mode (and optionally the
//! alternate screen); dropping the loop restores it. While running, the
//! loop waits for terminal input until the next tick is due, hands input to
//! the UI callback, and fires the tick callback on schedule. Everything
//! happens on the thread that calls [`EventLoop::run`].

use super::input::InputEvent;
use super::EventLoop;
use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io;
use std::ops::ControlFlow;
use std::time::{Duration, Instant};

/// Configuration for the terminal host.
#[derive(Debug, Clone)]
pub struct TerminalConfig {
    /// Whether to use the alternate screen buffer.
    pub alternate_screen: bool,
    /// Whether to enable mouse capture, delivering mouse events to the input handler.
    pub enable_mouse: bool,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            alternate_screen: true,
            enable_mouse: false,
        }
    }
}

type InputHandler = Box<dyn FnMut(InputEvent) -> ControlFlow<()>>;

/// Host loop that owns the terminal for its lifetime.
pub struct TerminalLoop {
    config: TerminalConfig,
    on_input: InputHandler,
}

impl TerminalLoop {
    /// Take over the terminal with default configuration.
    ///
    /// `on_input` runs on the UI thread for every input event; returning
    /// [`ControlFlow::Break`] ends the loop.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup fails.
    pub fn new(on_input: impl FnMut(InputEvent) -> ControlFlow<()> + 'static) -> io::Result<Self> {
        Self::with_config(TerminalConfig::default(), on_input)
    }

    /// Take over the terminal with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup fails.
    pub fn with_config(
        config: TerminalConfig,
        on_input: impl FnMut(InputEvent) -> ControlFlow<()> + 'static,
    ) -> io::Result<Self> {
        terminal::enable_raw_mode()?;

        let mut stdout = io::stdout();
        if config.alternate_screen {
            execute!(stdout, EnterAlternateScreen)?;
        }
        if config.enable_mouse {
            execute!(stdout, EnableMouseCapture)?;
        }
        execute!(stdout, cursor::Hide)?;
        tracing::debug!(?config, "terminal host ready");

        Ok(Self {
            config,
            on_input: Box::new(on_input),
        })
    }

    /// Current terminal size as (columns, rows).
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be queried.
    pub fn size() -> io::Result<(u16, u16)> {
        terminal::size()
    }
}

impl EventLoop for TerminalLoop {
    fn run(
        &mut self,
        interval: Duration,
        on_tick: &mut dyn FnMut() -> ControlFlow<()>,
    ) -> anyhow::Result<()> {
        let mut next_tick = Instant::now() + interval;

        loop {
            let timeout = next_tick.saturating_duration_since(Instant::now());
            if event::poll(timeout)? {
                if let Some(input) = InputEvent::from_crossterm(event::read()?) {
                    tracing::trace!(?input, "terminal input");
                    if (self.on_input)(input).is_break() {
                        break;
                    }
                }
            }

            let now = Instant::now();
            if now >= next_tick {
                if on_tick().is_break() {
                    break;
                }
                next_tick += interval;
                if next_tick < now {
                    next_tick = now + interval;
                }
            }
        }

        Ok(())
    }
}

impl Drop for TerminalLoop {
    fn drop(&mut self) {
        // Restore terminal state
        let mut stdout = io::stdout();
        let _ = execute!(stdout, cursor::Show);
        if self.config.enable_mouse {
            let _ = execute!(stdout, DisableMouseCapture);
        }
        if self.config.alternate_screen {
            let _ = execute!(stdout, LeaveAlternateScreen);
        }
        let _ = terminal::disable_raw_mode();
    }
}
