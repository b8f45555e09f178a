// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Fixed capacity input FIFO.
//!
//! The buffer raises the upstream enable whenever it is not full. A push into
//! a full buffer is a flow-control violation by the sender and is reported
//! as an error. Popping an empty buffer can only be caused by a grant without
//! a request and is treated as a fatal invariant violation.

use std::collections::VecDeque;
use std::rc::Rc;

use noc_engine::sim_error;
use noc_engine::traits::SimObject;
use noc_engine::types::{SimError, SimResult};
use noc_model_builder::EntityDisplay;
use noc_track::entity::Entity;
use noc_track::{enter, exit, value};

#[derive(EntityDisplay)]
pub struct InputBuffer<T>
where
    T: SimObject,
{
    pub entity: Rc<Entity>,
    capacity: usize,
    data: VecDeque<T>,
}

impl<T> InputBuffer<T>
where
    T: SimObject,
{
    pub fn new(parent: &Rc<Entity>, name: &str, capacity: usize) -> Result<Self, SimError> {
        if capacity == 0 {
            return sim_error!(format!("{parent}::{name}: capacity must be at least 1"));
        }
        Ok(Self {
            entity: Rc::new(Entity::new(parent, name)),
            capacity,
            data: VecDeque::with_capacity(capacity),
        })
    }

    #[must_use]
    pub fn can_accept(&self) -> bool {
        self.data.len() < self.capacity
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn push(&mut self, value: T) -> SimResult {
        if !self.can_accept() {
            return sim_error!(format!("{}: push of {value} into full buffer", self.entity));
        }
        enter!(self.entity ; value.id());
        self.data.push_back(value);
        value!(self.entity ; self.data.len());
        Ok(())
    }

    /// The oldest value, which is the only one that can make a request.
    #[must_use]
    pub fn head(&self) -> Option<&T> {
        self.data.front()
    }

    /// Remove the head.
    ///
    /// **Panics** if the buffer is empty.
    pub fn pop(&mut self) -> T {
        let Some(value) = self.data.pop_front() else {
            panic!("{}: dequeue from empty buffer", self.entity);
        };
        exit!(self.entity ; value.id());
        value!(self.entity ; self.data.len());
        value
    }

    #[must_use]
    pub fn fill_level(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
