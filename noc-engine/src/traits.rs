// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A set of common traits used across the NoC model.

use std::fmt::{Debug, Display};

use noc_track::Unique;

use crate::types::SimResult;

/// The `Routable` trait provides an interface to an object to enable it to be
/// routed
pub trait Routable {
    /// The raw destination field carried by the object.
    fn destination(&self) -> u64;
}

/// A super-trait that objects that are passed around the simulation have to
/// implement
///
///  - Clone:    routers present a copy of the head of a buffer on an output
///    before the buffer is popped at the clock edge.
///  - Debug:    In order to print "{:?}" objects have to at least implement
///    Debug.
///  - Display:  used in log messages.
///  - Routable: Allows routing.
///  - Unique:   Allows for simple tracking through buffers.
///  - 'static:  Objects are owned by buffers for an unbounded time.
pub trait SimObject: Clone + Debug + Display + Routable + Unique + 'static {}

/// A component that is evaluated and clocked by the
/// [`Engine`](crate::engine::Engine).
pub trait Clocked {
    /// Compute the outputs of the current cycle.
    ///
    /// Anything visible to other components, or to whoever is running the
    /// engine, only changes in [`update`](Self::update). Private choices such
    /// as arbitration pointers may advance here.
    fn evaluate(&self, tick: u64) -> SimResult;

    /// Apply the clock edge at the end of cycle `tick`.
    fn update(&self, tick: u64) -> SimResult;
}

// Implementations for basic types that can be sent around the simulation for
// testing

impl Routable for i32 {
    fn destination(&self) -> u64 {
        *self as u64
    }
}

impl SimObject for i32 {}

impl Routable for u64 {
    fn destination(&self) -> u64 {
        *self
    }
}

impl SimObject for u64 {}
