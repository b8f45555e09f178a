// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

#![doc(test(attr(warn(unused))))]

//! The cycle engine used by the NoC router model.
//!
//! Unlike an event driven executor, every registered
//! [component](crate::types::Component) is visited on every clock cycle in
//! two phases:
//!
//!  - `evaluate`: compute combinational outputs from the state at the start of
//!    the cycle.
//!  - `update`: apply the clock edge, moving state forward to the next cycle.
//!
//! All components are evaluated before any is updated, so the order in which
//! components are registered never changes the result.
//!
//! # Simple Application
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use noc_engine::engine::Engine;
//! use noc_engine::traits::Clocked;
//! use noc_engine::types::SimResult;
//!
//! struct Counter {
//!     count: Cell<u64>,
//! }
//!
//! impl Clocked for Counter {
//!     fn evaluate(&self, _tick: u64) -> SimResult {
//!         Ok(())
//!     }
//!     fn update(&self, _tick: u64) -> SimResult {
//!         self.count.set(self.count.get() + 1);
//!         Ok(())
//!     }
//! }
//!
//! let mut engine = Engine::default();
//! let counter = Rc::new(Counter { count: Cell::new(0) });
//! engine.register(counter.clone());
//! engine.run_cycles(10).unwrap();
//! assert_eq!(counter.count.get(), 10);
//! ```

pub mod engine;
pub mod test_helpers;
pub mod time;
pub mod traits;
pub mod types;

#[macro_export]
/// Run the simulation for a number of cycles and check the result.
macro_rules! run_simulation {
    ($engine:ident, $cycles:expr) => {
        $engine.run_cycles($cycles).unwrap();
    };
    ($engine:ident, $cycles:expr, $expect:expr) => {
        match $engine.run_cycles($cycles) {
            Ok(()) => panic!("Expected an error!"),
            Err(e) => assert_eq!(format!("{e}").as_str(), $expect),
        }
    };
}
