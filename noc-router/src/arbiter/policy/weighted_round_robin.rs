// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Weighted Round Robin policy

use std::rc::Rc;

use noc_engine::sim_error;
use noc_engine::types::SimError;
use noc_track::entity::Entity;
use noc_track::trace;

use crate::arbiter::Arbitrate;
use crate::types::Mask;

/// Round robin where the winner keeps the pointer until it has been granted
/// `weight` times in a row or stops requesting.
pub struct WeightedRoundRobin {
    candidate: usize,
    grants: Vec<usize>,
    weights: Vec<usize>,
}

impl WeightedRoundRobin {
    pub fn new(weights: Vec<usize>, num_inputs: usize) -> Result<Self, SimError> {
        if weights.len() != num_inputs {
            return sim_error!("The number of weights must be equal to the number of inputs");
        }
        if weights.contains(&0) {
            return sim_error!("Weights must be at least 1");
        }

        Ok(Self {
            candidate: 0,
            grants: vec![0; weights.len()],
            weights,
        })
    }

    pub fn state_str(&self, requests: Mask) -> String {
        let mut s = String::new();
        s.push_str(format!("{}: ", self.candidate).as_str());
        for (i, grant) in self.grants.iter().enumerate() {
            let req = if requests.is_set(i) { "r" } else { "-" };
            s.push_str(format!("{}/{}/{}, ", req, grant, self.weights[i]).as_str());
        }
        s
    }
}

impl Arbitrate for WeightedRoundRobin {
    fn arbitrate(&mut self, entity: &Rc<Entity>, requests: Mask) -> Option<usize> {
        trace!(entity ; "wrr: arbitrate {}", self.state_str(requests));

        let num_inputs = self.weights.len();
        let index = (0..num_inputs)
            .map(|i| (i + self.candidate) % num_inputs)
            .find(|index| requests.is_set(*index))?;

        if self.candidate != index {
            // The previous holder gave up the pointer early
            self.grants[self.candidate] = 0;
        }
        self.grants[index] += 1;
        if self.grants[index] >= self.weights[index] {
            self.grants[index] = 0;
            self.candidate = (index + 1) % num_inputs;
        } else {
            self.candidate = index;
        }
        Some(index)
    }
}
