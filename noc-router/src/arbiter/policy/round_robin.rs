// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Round Robin arbitration policy

use std::rc::Rc;

use noc_track::entity::Entity;

use crate::arbiter::Arbitrate;
use crate::types::Mask;

/// Grants the first requester at or after the candidate pointer. The pointer
/// then moves to one past the winner, so with `n` requesters each one waits
/// at most `n - 1` grants.
pub struct RoundRobin {
    candidate: usize,
    num_inputs: usize,
}

impl RoundRobin {
    #[must_use]
    pub fn new(num_inputs: usize) -> Self {
        Self {
            candidate: 0,
            num_inputs,
        }
    }

    /// The requester index that has highest priority next.
    #[must_use]
    pub fn candidate(&self) -> usize {
        self.candidate
    }
}

impl Arbitrate for RoundRobin {
    fn arbitrate(&mut self, _entity: &Rc<Entity>, requests: Mask) -> Option<usize> {
        let num_inputs = self.num_inputs;
        for i in 0..num_inputs {
            let index = (i + self.candidate) % num_inputs;
            if requests.is_set(index) {
                self.candidate = (index + 1) % num_inputs;
                return Some(index);
            }
        }
        None
    }
}
