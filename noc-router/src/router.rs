// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The five-port mesh router.
//!
//! # Ports
//!
//! Every router has five inputs and five outputs, indexed by [`Port`]:
//!  - `data[i]`: optional [`Flit`] arriving on input `i`.
//!  - `enable_in[j]`: downstream readiness of output `j`, one bit per VC.
//!  - `data[j]` / `data_valid[j]`: the flit leaving on output `j`.
//!  - `enable_out[i]`: readiness of input `i` for the upstream, one bit per
//!    VC.
//!
//! # Cycle
//!
//! A cycle is split into [`Router::evaluate`], which leaves every buffer
//! untouched, and [`Router::update`] which applies the clock edge. A value
//! pushed at the edge of cycle `t` can be granted at the earliest in cycle
//! `t + 1`.
//!
//! ```rust
//! use noc_engine::test_helpers::start_test;
//! use noc_router::config::RouterConfig;
//! use noc_router::router::{Router, RouterInputs};
//! use noc_router::types::{Coord, Flit, Port};
//!
//! let engine = start_test(file!());
//! let config = RouterConfig::default();
//! let mut router: Router<u64> =
//!     Router::new(engine.top(), "router_1_1", Coord::new(1, 1), &config).unwrap();
//!
//! // Destination (3,1): X in bits [3:2], Y in bits [1:0]
//! let inputs = RouterInputs::ready(1).with_data(Port::North, Flit::new(0, 0b1101));
//! let outputs = router.tick(&inputs).unwrap();
//! assert!(!outputs.data_valid.contains(&true));
//!
//! let outputs = router.tick(&RouterInputs::ready(1)).unwrap();
//! assert!(outputs.data_valid[Port::East.index()]);
//! ```

use std::rc::Rc;

use noc_engine::sim_error;
use noc_engine::traits::SimObject;
use noc_engine::types::{SimError, SimResult};
use noc_model_builder::{EntityDisplay, EntityGet};
use noc_track::entity::Entity;
use noc_track::{debug, trace};

use crate::buffer::InputBuffer;
use crate::config::RouterConfig;
use crate::crossbar;
use crate::output::{data_valid, dequeue_enables, port_dequeue_enables};
use crate::route::RouteCalculator;
use crate::switch_control::SwitchControl;
use crate::types::{
    Coord, Flit, GrantMatrix, Mask, NUM_PORTS, Port, RequestMatrix, requester_index,
    requester_port_vc,
};

/// The signals driven into a router for one cycle.
#[derive(Clone, Debug)]
pub struct RouterInputs<T> {
    pub data: [Option<Flit<T>>; NUM_PORTS],
    pub enable_in: [Mask; NUM_PORTS],
}

impl<T> RouterInputs<T> {
    /// No input data and every downstream ready on all `num_vcs` VCs.
    #[must_use]
    pub fn ready(num_vcs: usize) -> Self {
        Self {
            data: std::array::from_fn(|_| None),
            enable_in: [Mask::all(num_vcs); NUM_PORTS],
        }
    }

    /// No input data and no downstream ready.
    #[must_use]
    pub fn blocked() -> Self {
        Self {
            data: std::array::from_fn(|_| None),
            enable_in: [Mask::EMPTY; NUM_PORTS],
        }
    }

    #[must_use]
    pub fn with_data(mut self, port: Port, flit: Flit<T>) -> Self {
        self.data[port.index()] = Some(flit);
        self
    }

    #[must_use]
    pub fn with_enable(mut self, port: Port, enable: Mask) -> Self {
        self.enable_in[port.index()] = enable;
        self
    }
}

/// The signals driven out of a router in one cycle.
#[derive(Clone, Debug)]
pub struct RouterOutputs<T> {
    pub data: [Option<Flit<T>>; NUM_PORTS],
    pub data_valid: [bool; NUM_PORTS],
    pub enable_out: [Mask; NUM_PORTS],

    /// Dequeue enable per physical input.
    pub dequeue_enable: [bool; NUM_PORTS],

    /// Dequeue enable per requester (input and VC).
    pub vc_dequeue: Mask,
    pub grants: GrantMatrix,
}

/// Counters accumulated by a router, indexed by [`Port`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouterStats {
    /// Values accepted on each input.
    pub accepted: [u64; NUM_PORTS],

    /// Values sent on each output.
    pub forwarded: [u64; NUM_PORTS],

    /// Cycles in which each output was requested only on VCs whose
    /// downstream enable was low.
    pub stalled_cycles: [u64; NUM_PORTS],
}

impl RouterStats {
    #[must_use]
    pub fn total_accepted(&self) -> u64 {
        self.accepted.iter().sum()
    }

    #[must_use]
    pub fn total_forwarded(&self) -> u64 {
        self.forwarded.iter().sum()
    }
}

#[derive(EntityDisplay, EntityGet)]
pub struct Router<T>
where
    T: SimObject,
{
    pub entity: Rc<Entity>,
    location: Coord,
    num_vcs: usize,

    /// Indexed by requester.
    buffers: Vec<InputBuffer<T>>,
    route_calculator: RouteCalculator,
    switch_control: SwitchControl,
    latched_grants: Option<GrantMatrix>,
    stats: RouterStats,
}

impl<T> Router<T>
where
    T: SimObject,
{
    pub fn new(
        parent: &Rc<Entity>,
        name: &str,
        location: Coord,
        config: &RouterConfig,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let entity = Rc::new(Entity::new(parent, name));
        let route_calculator =
            RouteCalculator::new(location, config.mesh_shape()?, config.routing)?;

        let mut buffers = Vec::with_capacity(config.num_requesters());
        for port in Port::ALL {
            for vc in 0..config.num_vcs {
                let buffer_name = if config.num_vcs == 1 {
                    format!("rx_{port}")
                } else {
                    format!("rx_{port}_vc{vc}")
                };
                buffers.push(InputBuffer::new(
                    &entity,
                    &buffer_name,
                    config.buffer_depth,
                )?);
            }
        }
        let switch_control = SwitchControl::new(&entity, config)?;

        Ok(Self {
            entity,
            location,
            num_vcs: config.num_vcs,
            buffers,
            route_calculator,
            switch_control,
            latched_grants: None,
            stats: RouterStats::default(),
        })
    }

    #[must_use]
    pub fn location(&self) -> Coord {
        self.location
    }

    #[must_use]
    pub fn num_vcs(&self) -> usize {
        self.num_vcs
    }

    #[must_use]
    pub fn buffer(&self, port: Port, vc: usize) -> &InputBuffer<T> {
        &self.buffers[requester_index(port, vc, self.num_vcs)]
    }

    #[must_use]
    pub fn occupancy(&self, port: Port, vc: usize) -> usize {
        self.buffer(port, vc).fill_level()
    }

    /// Total number of values held across all input buffers.
    #[must_use]
    pub fn num_buffered(&self) -> usize {
        self.buffers.iter().map(InputBuffer::fill_level).sum()
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.buffers.iter().all(InputBuffer::is_empty)
    }

    #[must_use]
    pub fn stats(&self) -> &RouterStats {
        &self.stats
    }

    /// Upstream enables: bit `v` of `enable_out[i]` is set when the FIFO of
    /// input `i` VC `v` is not full.
    #[must_use]
    pub fn enable_out(&self) -> [Mask; NUM_PORTS] {
        std::array::from_fn(|i| {
            let mut enable = Mask::EMPTY;
            for vc in 0..self.num_vcs {
                if self.buffers[i * self.num_vcs + vc].can_accept() {
                    enable.set(vc);
                }
            }
            enable
        })
    }

    /// Output requests computed from the current buffer heads.
    #[must_use]
    pub fn requests(&self) -> RequestMatrix {
        let mut requests = RequestMatrix::new(self.buffers.len());
        for (requester, buffer) in self.buffers.iter().enumerate() {
            let row = match buffer.head() {
                Some(head) => self.route_calculator.route(head.destination(), true),
                None => self.route_calculator.route(0, false),
            };
            requests.set_row(requester, row);
        }
        requests
    }

    /// Compute the outputs of the current cycle.
    ///
    /// Buffers are left untouched. The grants are held until the next call
    /// to [`update`](Self::update).
    pub fn evaluate(&mut self, enable_in: &[Mask; NUM_PORTS]) -> RouterOutputs<T> {
        let enable_out = self.enable_out();
        let requests = self.requests();
        let grants = self.switch_control.arbitrate(&requests, enable_in);

        for port in Port::ALL {
            let column = requests.column(port);
            let blocked = column.iter().all(|requester| {
                let (_, vc) = requester_port_vc(requester, self.num_vcs);
                !enable_in[port.index()].is_set(vc)
            });
            if column.any() && blocked {
                self.stats.stalled_cycles[port.index()] += 1;
            }
        }

        let heads: Vec<Option<&T>> = self.buffers.iter().map(InputBuffer::head).collect();
        let data = crossbar::switch(&grants, &heads, self.num_vcs);
        if grants.any() {
            trace!(self.entity ; "grants {grants}");
        }

        let outputs = RouterOutputs {
            data,
            data_valid: data_valid(&grants),
            enable_out,
            dequeue_enable: port_dequeue_enables(&grants, self.num_vcs),
            vc_dequeue: dequeue_enables(&grants),
            grants: grants.clone(),
        };
        self.latched_grants = Some(grants);
        outputs
    }

    /// Apply the clock edge: pop every granted buffer then push the values
    /// arriving from upstream.
    ///
    /// A value that arrives for a buffer that was full at the start of the
    /// cycle, or on a VC this router does not have, is an error. Arrivals are
    /// checked before any buffer changes, so an error leaves the router as it
    /// was before the edge.
    pub fn update(&mut self, upstream: &[Option<Flit<T>>; NUM_PORTS]) -> SimResult {
        let enable_out = self.enable_out();
        for (input, flit) in Port::ALL.iter().zip(upstream) {
            let Some(flit) = flit else {
                continue;
            };
            if flit.vc >= self.num_vcs {
                return sim_error!(format!(
                    "{}: {} arrived on {input} for vc {} but only {} VCs exist",
                    self.entity, flit.value, flit.vc, self.num_vcs
                ));
            }
            if !enable_out[input.index()].is_set(flit.vc) {
                return sim_error!(format!(
                    "{}: {} arrived on {input} vc {} while the buffer was full",
                    self.entity, flit.value, flit.vc
                ));
            }
        }

        if let Some(grants) = self.latched_grants.take() {
            for (output, requester) in grants.iter() {
                let value = self.buffers[requester].pop();
                trace!(self.entity ; "{value} -> {output}");
                self.stats.forwarded[output.index()] += 1;
            }
        }

        for (input, flit) in Port::ALL.iter().zip(upstream) {
            if let Some(flit) = flit {
                let requester = requester_index(*input, flit.vc, self.num_vcs);
                self.buffers[requester].push(flit.value.clone())?;
                self.stats.accepted[input.index()] += 1;
            }
        }
        Ok(())
    }

    /// Run one full cycle of a standalone router.
    pub fn tick(&mut self, inputs: &RouterInputs<T>) -> Result<RouterOutputs<T>, SimError> {
        let outputs = self.evaluate(&inputs.enable_in);
        self.update(&inputs.data)?;
        Ok(outputs)
    }

    pub fn log_stats(&self) {
        debug!(self.entity ; "accepted {:?}, forwarded {:?}, stalled {:?}",
            self.stats.accepted, self.stats.forwarded, self.stats.stalled_cycles);
    }
}
