// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Arbitration between the requesters of one output.
//!
//! An arbitration policy is handed the set of eligible requesters for an
//! output as a [`Mask`] and selects at most one of them. Policies keep their
//! own state (for example a round-robin pointer) and are only advanced when
//! they make a grant.
//!
//! Policies are configured per router with an [`ArbitrationPolicy`] which
//! describes the policy in terms of physical ports. When a router has virtual
//! channels the settings of each port are repeated for each of its virtual
//! channels.

use std::rc::Rc;

use noc_engine::sim_error;
use noc_engine::types::SimError;
use noc_track::entity::Entity;
use serde::{Deserialize, Serialize};

use crate::arbiter::policy::{
    FixedPriority, Priority, PriorityRoundRobin, RoundRobin, WeightedRoundRobin,
};
use crate::types::{Mask, NUM_PORTS};

pub mod policy;

pub trait Arbitrate {
    /// Select one of the requesters set in `requests`.
    ///
    /// Returns `None` if and only if `requests` is empty.
    fn arbitrate(&mut self, entity: &Rc<Entity>, requests: Mask) -> Option<usize>;
}

/// The configurable arbitration policies.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ArbitrationPolicy {
    #[default]
    /// Grant the first requester after the previous winner
    RoundRobin,

    /// Always grant the lowest requester index. Can starve other inputs.
    FixedPriority,

    /// Round robin where each port may win up to `weight` consecutive grants
    WeightedRoundRobin { weights: Vec<usize> },

    /// Round robin within the highest priority level that is requesting
    PriorityRoundRobin { priorities: Vec<Priority> },
}

impl ArbitrationPolicy {
    /// Build one policy instance for an output with `num_vcs` virtual
    /// channels on each input.
    pub fn build(&self, num_vcs: usize) -> Result<Box<dyn Arbitrate>, SimError> {
        let num_inputs = NUM_PORTS * num_vcs;
        let policy: Box<dyn Arbitrate> = match self {
            ArbitrationPolicy::RoundRobin => Box::new(RoundRobin::new(num_inputs)),
            ArbitrationPolicy::FixedPriority => Box::new(FixedPriority::new()),
            ArbitrationPolicy::WeightedRoundRobin { weights } => {
                let weights = expand_per_port("weights", weights, num_vcs)?;
                Box::new(WeightedRoundRobin::new(weights, num_inputs)?)
            }
            ArbitrationPolicy::PriorityRoundRobin { priorities } => {
                let priorities = expand_per_port("priorities", priorities, num_vcs)?;
                Box::new(PriorityRoundRobin::from_priorities(priorities, num_inputs)?)
            }
        };
        Ok(policy)
    }
}

/// Repeat a per-port setting for every virtual channel of the port.
fn expand_per_port<V: Copy>(what: &str, values: &[V], num_vcs: usize) -> Result<Vec<V>, SimError> {
    if values.len() != NUM_PORTS {
        return sim_error!(format!(
            "Expected {NUM_PORTS} {what}, one per port, got {}",
            values.len()
        ));
    }
    Ok(values
        .iter()
        .flat_map(|v| std::iter::repeat_n(*v, num_vcs))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand() {
        let expanded = expand_per_port("weights", &[1, 2, 3, 4, 5], 2).unwrap();
        assert_eq!(expanded, vec![1, 1, 2, 2, 3, 3, 4, 4, 5, 5]);
    }

    #[test]
    fn wrong_length() {
        let policy = ArbitrationPolicy::WeightedRoundRobin {
            weights: vec![1, 2],
        };
        let err = policy.build(1).err().unwrap();
        assert_eq!(err.0, "Expected 5 weights, one per port, got 2");
    }
}
