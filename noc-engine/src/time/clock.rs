// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! This module represents the time during a simulation.
//!
//! Time is a count of ticks of a single clock. The clock frequency is only
//! used to convert ticks into nanoseconds for reporting and tracing.

use std::cell::Cell;
use std::rc::Rc;

use noc_track::entity::Entity;
use noc_track::set_time;

/// Shared state between all copies of a [`Clock`].
struct ClockState {
    now: Cell<u64>,
}

#[derive(Clone)]
/// State representing a clock.
pub struct Clock {
    pub entity: Rc<Entity>,

    /// Frequency of the clock in MHz.
    /// *Note*: Should never be changed once created.
    freq_mhz: f64,

    shared_state: Rc<ClockState>,
}

impl Clock {
    #[must_use]
    pub fn new(parent: &Rc<Entity>, freq_mhz: f64) -> Self {
        Self {
            entity: Rc::new(Entity::new(parent, "clk")),
            freq_mhz,
            shared_state: Rc::new(ClockState { now: Cell::new(0) }),
        }
    }

    /// Get the clock frequency in MHz.
    #[must_use]
    pub fn freq_mhz(&self) -> f64 {
        self.freq_mhz
    }

    /// Get the current clock tick.
    #[must_use]
    pub fn tick_now(&self) -> u64 {
        self.shared_state.now.get()
    }

    /// Convert a number of ticks to nanoseconds at this clock's frequency.
    #[must_use]
    pub fn to_ns(&self, ticks: u64) -> f64 {
        ticks as f64 * 1000.0 / self.freq_mhz
    }

    /// Get the current time in nanoseconds.
    #[must_use]
    pub fn time_now_ns(&self) -> f64 {
        self.to_ns(self.tick_now())
    }

    /// Move to the next clock tick.
    pub fn advance(&self) {
        let now = &self.shared_state.now;
        now.set(now.get() + 1);
        set_time!(self.entity ; self.time_now_ns());
    }
}
