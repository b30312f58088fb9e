//! Sensor readout demo.
//!
//! A terminal UI actor displays values published by a simulated sensor
//! monitor running on its own thread. Keys:
//!
//! - `m`: start/stop monitoring (toggles the UI's Floor/Proximity/PSD subscriptions)
//! - `b`: beep
//! - `←`/`→` or the mouse wheel: move the servo
//! - `q`, `Esc` or `Ctrl+C`: quit
//!
//! Logs go to `tether-sensors.log` in the temp directory.
//!
//! Run with: `cargo run --example sensors`

use crossterm::{
    cursor::MoveTo,
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tether::{
    init_tracing, ActorGroup, Context, GuiReactor, InputEvent, KeyCode, LogConfig, LogTarget,
    React, Reactor, Registry, Signal, TerminalConfig, TerminalLoop,
};

/// Payload carried by every signal in this application.
#[derive(Debug, Clone)]
enum Reading {
    Pair(u16, u16),
    Level(u16),
    Angle(u8),
    Beep { hz: u16, secs: f32 },
    Key(KeyCode),
    Text(String),
    Poll,
}

const MONITORED: [&str; 3] = ["Floor", "Proximity", "PSD"];

/// Publishes simulated sensor values at a fixed rate.
struct Monitor {
    poll_interval: Duration,
    step: u16,
    angle: u8,
}

impl Monitor {
    fn poll(&mut self, ctx: &Context<Reading>) -> anyhow::Result<()> {
        self.step = (self.step + 1) % 1000;
        let t = self.step;
        let angle = u16::from(self.angle);
        ctx.broadcast("Floor", Reading::Pair((t * 37) % 1024, (t * 53) % 1024));
        ctx.broadcast("Proximity", Reading::Pair((angle * 3 + t) % 256, (angle + t * 5) % 256));
        ctx.broadcast("PSD", Reading::Level(100 + (t * 7) % 50 + angle));
        ctx.addr().send(Signal::new("Poll", ctx.name(), Reading::Poll))?;
        Ok(())
    }
}

impl React<Reading> for Monitor {
    fn react(&mut self, signal: Arc<Signal<Reading>>, ctx: &mut Context<Reading>) -> anyhow::Result<()> {
        match signal.data() {
            Reading::Poll => {
                thread::sleep(self.poll_interval);
                self.poll(ctx)?;
            }
            Reading::Angle(angle) => {
                tracing::debug!(angle, "servo moved");
                self.angle = *angle;
            }
            other => tracing::warn!(?other, "monitor ignored signal"),
        }
        Ok(())
    }

    fn run_pre(&mut self, ctx: &mut Context<Reading>) -> anyhow::Result<()> {
        ctx.addr().send(Signal::new("Poll", ctx.name(), Reading::Poll))?;
        Ok(())
    }
}

/// Plays beeps one after another.
struct Beeper;

impl React<Reading> for Beeper {
    fn react(&mut self, signal: Arc<Signal<Reading>>, ctx: &mut Context<Reading>) -> anyhow::Result<()> {
        if let Reading::Beep { hz, secs } = signal.data() {
            tracing::info!(hz, secs, sender = signal.sender(), "beep");
            thread::sleep(Duration::from_secs_f32(*secs));
            ctx.broadcast_to(
                "Status",
                signal.sender(),
                Reading::Text(format!("beeped {hz} Hz for {secs}s")),
            );
        }
        Ok(())
    }
}

/// What the screen currently shows.
struct Panel {
    floor: Option<(u16, u16)>,
    proximity: Option<(u16, u16)>,
    psd: Option<u16>,
    servo: u8,
    status: String,
}

impl Default for Panel {
    fn default() -> Self {
        Self {
            floor: None,
            proximity: None,
            psd: None,
            servo: 90,
            status: String::from("ready"),
        }
    }
}

fn pair(value: Option<(u16, u16)>) -> String {
    value.map_or_else(|| "(?, ?)".to_string(), |(a, b)| format!("({a}, {b})"))
}

impl Panel {
    fn on_key(&mut self, code: KeyCode, ctx: &Context<Reading>) {
        match code {
            KeyCode::Char('m') => {
                for name in MONITORED {
                    ctx.registry().toggle_registered(name, ctx.addr());
                }
            }
            KeyCode::Char('b') => {
                ctx.broadcast("Beep", Reading::Beep { hz: 40, secs: 0.2 });
                ctx.broadcast("Beep", Reading::Beep { hz: 0, secs: 0.1 });
            }
            KeyCode::Left | KeyCode::Right => {
                self.servo = if code == KeyCode::Left {
                    self.servo.saturating_sub(6).max(6)
                } else {
                    self.servo.saturating_add(6).min(180)
                };
                ctx.broadcast("Servo", Reading::Angle(self.servo));
            }
            _ => {}
        }
    }

    fn draw(&self, ctx: &Context<Reading>) -> io::Result<()> {
        let monitoring = ctx.registry().is_registered("Floor", ctx.name());
        let lines = [
            "Tether sensors demo".to_string(),
            String::new(),
            format!("Floor: {}", pair(self.floor)),
            format!("Prox:  {}", pair(self.proximity)),
            format!("PSD:   {}", self.psd.map_or_else(|| "?".to_string(), |v| v.to_string())),
            format!("Servo: {} deg", self.servo),
            String::new(),
            format!("Status: {}", self.status),
            format!(
                "[m] {}  [b] Beep  [←/→] Servo  [q] Quit",
                if monitoring { "Stop Monitoring" } else { "Monitor" }
            ),
        ];

        let mut stdout = io::stdout();
        for (row, line) in (0u16..).zip(lines) {
            queue!(stdout, MoveTo(0, row), Clear(ClearType::CurrentLine), Print(line))?;
        }
        stdout.flush()
    }
}

impl React<Reading> for Panel {
    fn react(&mut self, signal: Arc<Signal<Reading>>, ctx: &mut Context<Reading>) -> anyhow::Result<()> {
        match (signal.name(), signal.data()) {
            ("Floor", Reading::Pair(a, b)) => self.floor = Some((*a, *b)),
            ("Proximity", Reading::Pair(a, b)) => self.proximity = Some((*a, *b)),
            ("PSD", Reading::Level(v)) => self.psd = Some(*v),
            ("Status", Reading::Text(text)) if signal.is_for(ctx.name()) => {
                self.status.clone_from(text);
            }
            ("Key", Reading::Key(code)) => self.on_key(*code, ctx),
            _ => tracing::debug!(signal = signal.name(), "display ignored signal"),
        }
        Ok(())
    }

    fn run_pre(&mut self, ctx: &mut Context<Reading>) -> anyhow::Result<()> {
        self.draw(ctx)?;
        Ok(())
    }

    fn received_done(&mut self, ctx: &mut Context<Reading>) {
        if let Err(e) = self.draw(ctx) {
            tracing::warn!(error = %e, "redraw failed");
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing(&LogConfig {
        default_filter: "debug".to_string(),
        target: LogTarget::File(std::env::temp_dir().join("tether-sensors.log")),
        ..LogConfig::default()
    })?;

    let registry = Registry::new();

    // Input arrives on the UI thread and is forwarded as "Key" signals.
    // The wheel stands in for the arrow keys.
    let keys = registry.clone();
    let config = TerminalConfig {
        enable_mouse: true,
        ..TerminalConfig::default()
    };
    let host = TerminalLoop::with_config(config, move |input| {
        if input.is_interrupt() {
            return ControlFlow::Break(());
        }
        match input {
            InputEvent::Key {
                code: KeyCode::Char('q') | KeyCode::Esc,
                ..
            } => ControlFlow::Break(()),
            InputEvent::Key { code, .. } => {
                keys.broadcast(Signal::new("Key", "keyboard", Reading::Key(code)));
                ControlFlow::Continue(())
            }
            InputEvent::MouseScroll { delta, .. } => {
                let code = if delta > 0 { KeyCode::Right } else { KeyCode::Left };
                keys.broadcast(Signal::new("Key", "mouse", Reading::Key(code)));
                ControlFlow::Continue(())
            }
            _ => ControlFlow::Continue(()),
        }
    })?;

    let mut gui = GuiReactor::new("GUI", Panel::default(), &registry, host);
    registry.register("Key", &gui);
    registry.register("Status", &gui);

    let monitor = Reactor::new(
        "Sensors Monitor",
        Monitor {
            poll_interval: Duration::from_millis(100),
            step: 0,
            angle: 90,
        },
        &registry,
    );
    registry.register("Servo", &monitor);

    let beeper = Reactor::new("Beeper", Beeper, &registry);
    registry.register("Beep", &beeper);

    let mut workers = ActorGroup::new();
    workers.add(monitor)?;
    workers.add(beeper)?;
    workers.start_all()?;

    let outcome = gui.start();
    // Restores the terminal before anything is printed.
    drop(gui);

    workers.quit_all()?;
    outcome?;
    Ok(())
}
