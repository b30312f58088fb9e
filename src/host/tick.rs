//! Headless host loop driven by a fixed-rate schedule.
//!
//! Useful wherever there is no windowing toolkit: tests, batch runs, or a
//! main thread that only needs to funnel signals through one place.

use super::EventLoop;
use std::ops::ControlFlow;
use std::thread;
use std::time::{Duration, Instant};

/// Fixed-rate loop that runs on the calling thread.
#[derive(Debug, Clone, Default)]
pub struct TickLoop {
    /// Ticks delivered since construction.
    ticks: u64,
    /// Stop after this many ticks in total.
    limit: Option<u64>,
}

impl TickLoop {
    /// Create a loop that runs until its callback breaks.
    pub const fn new() -> Self {
        Self {
            ticks: 0,
            limit: None,
        }
    }

    /// Create a loop that also stops on its own after `limit` ticks.
    pub const fn with_limit(limit: u64) -> Self {
        Self {
            ticks: 0,
            limit: Some(limit),
        }
    }

    /// Ticks delivered so far.
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    fn exhausted(&self) -> bool {
        self.limit.is_some_and(|limit| self.ticks >= limit)
    }
}

impl EventLoop for TickLoop {
    fn run(
        &mut self,
        interval: Duration,
        on_tick: &mut dyn FnMut() -> ControlFlow<()>,
    ) -> anyhow::Result<()> {
        let mut next_tick = Instant::now() + interval;

        while !self.exhausted() {
            let now = Instant::now();
            if now < next_tick {
                thread::sleep(next_tick - now);
                continue;
            }

            self.ticks += 1;
            if on_tick().is_break() {
                break;
            }

            next_tick += interval;
            // Behind schedule: skip missed ticks instead of bursting.
            if next_tick < now {
                next_tick = now + interval;
            }
        }

        tracing::trace!(ticks = self.ticks, "tick loop finished");
        Ok(())
    }
}
