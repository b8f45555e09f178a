// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::rc::Rc;

use noc_track::entity::{Entity, toplevel};
use noc_track::tracker::stdout_tracker;
use noc_track::{Tracker, trace};

use crate::sim_error;
use crate::time::clock::Clock;
use crate::types::{Component, SimResult};

/// Use a default clock frequency of 1GHz.
const DEFAULT_CLOCK_MHZ: f64 = 1000.0;

pub struct Engine {
    toplevel: Rc<Entity>,
    clock: Clock,
    components: Vec<Component>,
}

impl Engine {
    /// Create a standalone engine.
    pub fn new(tracker: &Tracker) -> Self {
        Self::new_with_clock_mhz(tracker, DEFAULT_CLOCK_MHZ)
    }

    /// Create an engine whose clock runs at `freq_mhz`.
    pub fn new_with_clock_mhz(tracker: &Tracker, freq_mhz: f64) -> Self {
        let toplevel = toplevel(tracker, "top");
        let clock = Clock::new(&toplevel, freq_mhz);
        Self {
            toplevel,
            clock,
            components: Vec::new(),
        }
    }

    /// Register a component to be evaluated and clocked every cycle.
    pub fn register(&mut self, component: Component) {
        self.components.push(component);
    }

    /// Run a single clock cycle.
    ///
    /// Every component is evaluated before any component is updated.
    pub fn step(&mut self) -> SimResult {
        let tick = self.clock.tick_now();
        trace!(self.toplevel ; "cycle {tick}");
        for component in &self.components {
            component.evaluate(tick)?;
        }
        for component in &self.components {
            component.update(tick)?;
        }
        self.clock.advance();
        Ok(())
    }

    /// Run for a fixed number of cycles.
    pub fn run_cycles(&mut self, num_cycles: u64) -> SimResult {
        for _ in 0..num_cycles {
            self.step()?;
        }
        Ok(())
    }

    /// Run until `done` returns true.
    ///
    /// Returns an error if `done` is still false after `max_cycles` cycles.
    pub fn run_until<F>(&mut self, max_cycles: u64, mut done: F) -> SimResult
    where
        F: FnMut() -> bool,
    {
        let start = self.clock.tick_now();
        while !done() {
            if self.clock.tick_now() - start >= max_cycles {
                return sim_error!(format!(
                    "Deadlock: not finished after {max_cycles} cycles"
                ));
            }
            self.step()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    #[must_use]
    pub fn time_now_ns(&self) -> f64 {
        self.clock.time_now_ns()
    }

    #[must_use]
    pub fn top(&self) -> &Rc<Entity> {
        &self.toplevel
    }
}

/// Create a default engine that sends [`Track`](noc_track::Track) events to
/// stdout.
///
/// This is provided to keep documentation examples simple with fewer
/// concepts to have to consider at once.
impl Default for Engine {
    fn default() -> Self {
        let tracker = stdout_tracker(log::Level::Warn);
        Self::new(&tracker)
    }
}
