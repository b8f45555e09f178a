// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Priority Round Robin arbitration policy

use std::collections::BTreeMap;
use std::rc::Rc;

use noc_engine::sim_error;
use noc_engine::types::SimError;
use noc_track::entity::Entity;
use serde::{Deserialize, Serialize};

use crate::arbiter::Arbitrate;
use crate::types::Mask;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    #[default]
    Low = 0,
    Medium,
    High,
}

struct PriorityLevel {
    current_candidate_index: usize,
    candidates: Vec<usize>,
}

pub struct PriorityRoundRobin<P>
where
    P: Copy + Default + Ord,
{
    priority_map: BTreeMap<P, PriorityLevel>,
}

impl<P> PriorityRoundRobin<P>
where
    P: Copy + Default + Ord,
{
    /// All inputs at the default priority. Behaves as round robin.
    #[must_use]
    pub fn new(num_inputs: usize) -> Self {
        Self {
            priority_map: create_map(&vec![P::default(); num_inputs]),
        }
    }

    pub fn from_priorities(priority_vec: Vec<P>, num_inputs: usize) -> Result<Self, SimError> {
        if priority_vec.len() != num_inputs {
            return sim_error!("The number of priorities must be equal to the number of inputs");
        }

        Ok(Self {
            priority_map: create_map(&priority_vec),
        })
    }
}

fn create_map<P: Copy + Ord>(priority_vec: &[P]) -> BTreeMap<P, PriorityLevel> {
    let mut priority_map = BTreeMap::new();
    for (i, priority) in priority_vec.iter().enumerate() {
        priority_map
            .entry(*priority)
            .and_modify(|e: &mut PriorityLevel| {
                e.candidates.push(i);
            })
            .or_insert(PriorityLevel {
                current_candidate_index: 0,
                candidates: Vec::from([i]),
            });
    }
    priority_map
}

impl<P> Arbitrate for PriorityRoundRobin<P>
where
    P: Copy + Default + Ord,
{
    fn arbitrate(&mut self, _entity: &Rc<Entity>, requests: Mask) -> Option<usize> {
        for priority_level in self.priority_map.values_mut().rev() {
            let candidates = &priority_level.candidates;
            let num_inputs = candidates.len();
            for i in 0..num_inputs {
                let priority_index = (i + priority_level.current_candidate_index) % num_inputs;
                let input_index = candidates[priority_index];
                if requests.is_set(input_index) {
                    priority_level.current_candidate_index = (priority_index + 1) % num_inputs;
                    return Some(input_index);
                }
            }
        }
        None
    }
}
