// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Switch control: output-exclusive arbitration of the router requests.
//!
//! Each output has its own arbitration policy. For each output the column of
//! the request matrix is first masked by the downstream enable of the VC that
//! each requester would use. The policy then selects at most one eligible
//! requester.

use std::rc::Rc;

use noc_engine::types::SimError;
use noc_model_builder::{EntityDisplay, EntityGet};
use noc_track::entity::Entity;
use noc_track::trace;
use serde::{Deserialize, Serialize};

use crate::arbiter::Arbitrate;
use crate::config::RouterConfig;
use crate::types::{
    GrantMatrix, Mask, NUM_PORTS, Port, RequestMatrix, requester_index, requester_port_vc,
};

/// How the virtual channels of one physical input share the crossbar.
#[derive(clap::ValueEnum, Clone, Copy, Default, Debug, Serialize, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VcDequeue {
    #[default]
    /// Every VC arbitrates on its own. Several VCs of an input can be
    /// dequeued in the same cycle.
    Independent,

    /// Each input nominates one VC per cycle in round-robin order.
    OnePerInput,
}

struct OutputArbiter {
    entity: Rc<Entity>,
    policy: Box<dyn Arbitrate>,
}

#[derive(EntityDisplay, EntityGet)]
pub struct SwitchControl {
    pub entity: Rc<Entity>,
    num_vcs: usize,
    vc_dequeue: VcDequeue,
    arbiters: Vec<OutputArbiter>,
    vc_candidates: [usize; NUM_PORTS],
}

impl SwitchControl {
    /// Create the switch control of a router. The per-output arbiters are
    /// named `arb_<port>` under `parent`.
    pub fn new(parent: &Rc<Entity>, config: &RouterConfig) -> Result<Self, SimError> {
        let mut arbiters = Vec::with_capacity(NUM_PORTS);
        for port in Port::ALL {
            arbiters.push(OutputArbiter {
                entity: Rc::new(Entity::new(parent, &format!("arb_{port}"))),
                policy: config.arbitration.build(config.num_vcs)?,
            });
        }
        Ok(Self {
            entity: parent.clone(),
            num_vcs: config.num_vcs,
            vc_dequeue: config.vc_dequeue,
            arbiters,
            vc_candidates: [0; NUM_PORTS],
        })
    }

    #[must_use]
    pub fn vc_dequeue(&self) -> VcDequeue {
        self.vc_dequeue
    }

    /// Compute this cycle's grants.
    ///
    /// A request from input `i` on VC `v` for output `j` is only eligible if
    /// bit `v` of `enable_in[j]` is set.
    pub fn arbitrate(&mut self, requests: &RequestMatrix, enable_in: &[Mask; NUM_PORTS]) -> GrantMatrix {
        let num_requesters = requests.num_requesters();
        debug_assert_eq!(num_requesters, NUM_PORTS * self.num_vcs);

        let mut eligible = RequestMatrix::new(num_requesters);
        for requester in 0..num_requesters {
            let (_, vc) = requester_port_vc(requester, self.num_vcs);
            let row = requests.row(requester);
            let mut outputs = Mask::EMPTY;
            for output in Port::ALL {
                if row.is_set(output.index()) && enable_in[output.index()].is_set(vc) {
                    outputs.set(output.index());
                }
            }
            eligible.set_row(requester, outputs);
        }

        let nominated = match self.vc_dequeue {
            VcDequeue::Independent => None,
            VcDequeue::OnePerInput => Some(self.nominate(&mut eligible)),
        };

        let mut grants = GrantMatrix::new(num_requesters);
        for output in Port::ALL {
            let column = eligible.column(output);
            let arbiter = &mut self.arbiters[output.index()];
            if let Some(requester) = arbiter.policy.arbitrate(&arbiter.entity, column) {
                trace!(arbiter.entity ; "grant {requester} from {column}");
                grants.grant(output, requester);
            }
        }

        if let Some(nominated) = nominated {
            self.advance_vc_candidates(&nominated, &grants);
        }
        grants
    }

    /// Keep only one VC with an eligible request per input.
    fn nominate(&self, eligible: &mut RequestMatrix) -> [Option<usize>; NUM_PORTS] {
        let mut nominated = [None; NUM_PORTS];
        for input in Port::ALL {
            let start = self.vc_candidates[input.index()];
            let chosen = (0..self.num_vcs)
                .map(|i| (i + start) % self.num_vcs)
                .find(|vc| eligible.row(requester_index(input, *vc, self.num_vcs)).any());
            for vc in 0..self.num_vcs {
                if Some(vc) != chosen {
                    eligible.set_row(requester_index(input, vc, self.num_vcs), Mask::EMPTY);
                }
            }
            nominated[input.index()] = chosen;
        }
        nominated
    }

    fn advance_vc_candidates(&mut self, nominated: &[Option<usize>; NUM_PORTS], grants: &GrantMatrix) {
        for (_, requester) in grants.iter() {
            let (input, vc) = requester_port_vc(requester, self.num_vcs);
            if nominated[input.index()] == Some(vc) {
                self.vc_candidates[input.index()] = (vc + 1) % self.num_vcs;
            }
        }
    }
}
