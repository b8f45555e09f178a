// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Traffic sources and sinks attached to the `Local` port of each router.

use std::rc::Rc;

use noc_engine::sim_error;
use noc_engine::traits::Routable;
use noc_engine::types::SimResult;
use noc_model_builder::{EntityDisplay, EntityGet};
use noc_router::packet::{MeshShape, Packet};
use noc_router::types::{Coord, Flit, Mask};
use noc_track::entity::Entity;
use noc_track::{Unique, enter, exit, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Injects packets with uniform random destinations.
///
/// A packet is created with probability `injection_rate` at any clock edge
/// where the source is not already holding one, and is offered from the next
/// cycle. The packet is held until the router raises the enable of the
/// packet's VC. VCs are used in turn.
#[derive(EntityDisplay, EntityGet)]
pub struct TrafficSource {
    pub entity: Rc<Entity>,
    location: Coord,
    shape: MeshShape,
    num_vcs: usize,
    injection_rate: f64,
    num_to_send: usize,
    num_created: usize,
    num_sent: usize,
    next_vc: usize,
    pending: Option<Flit<Packet>>,
    rng: StdRng,
}

impl TrafficSource {
    #[expect(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        parent: &Rc<Entity>,
        name: &str,
        location: Coord,
        shape: MeshShape,
        num_vcs: usize,
        injection_rate: f64,
        num_to_send: usize,
        seed: u64,
    ) -> Self {
        // Create a local RNG which is different per source
        let source_index = shape.encode(location);
        Self {
            entity: Rc::new(Entity::new(parent, name)),
            location,
            shape,
            num_vcs,
            injection_rate,
            num_to_send,
            num_created: 0,
            num_sent: 0,
            next_vc: 0,
            pending: None,
            rng: StdRng::seed_from_u64(seed ^ source_index),
        }
    }

    /// The flit offered to the router in this cycle, if any.
    ///
    /// `enable` is the router's `enable_out` for the `Local` input. The
    /// packet stays pending until [`update`](Self::update) is told it was
    /// sent.
    #[must_use]
    pub fn evaluate(&self, enable: Mask) -> Option<Flit<Packet>> {
        self.pending
            .as_ref()
            .filter(|flit| enable.is_set(flit.vc))
            .cloned()
    }

    /// Clock edge at the end of cycle `tick`.
    ///
    /// Retires the pending packet if it was `sent`, then may create the packet
    /// to offer from the next cycle.
    pub fn update(&mut self, tick: u64, sent: bool) {
        let retired = if sent { self.pending.take() } else { None };
        if let Some(flit) = retired {
            exit!(self.entity ; flit.value.id());
            self.num_sent += 1;
        }

        if self.pending.is_none()
            && self.num_created < self.num_to_send
            && self.rng.gen_bool(self.injection_rate)
        {
            let dest = Coord::new(
                self.rng.gen_range(0..self.shape.num_columns()),
                self.rng.gen_range(0..self.shape.num_rows()),
            );
            let packet = Packet::new(&self.entity, self.shape.encode(dest))
                .with_source(self.location)
                .with_payload(self.num_created as u64)
                .with_injected_tick(tick + 1);
            trace!(self.entity ; "created {packet} for {dest} on vc {}", self.next_vc);
            self.pending = Some(Flit::new(self.next_vc, packet));
            self.next_vc = (self.next_vc + 1) % self.num_vcs;
            self.num_created += 1;
        }
    }

    #[must_use]
    pub fn num_sent(&self) -> usize {
        self.num_sent
    }

    #[must_use]
    pub fn num_to_send(&self) -> usize {
        self.num_to_send
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.num_sent == self.num_to_send
    }
}

/// Accepts every packet and checks it reached the right node.
#[derive(EntityDisplay, EntityGet)]
pub struct TrafficSink {
    pub entity: Rc<Entity>,
    location: Coord,
    shape: MeshShape,
    num_received: usize,
    total_latency: u64,
    max_latency: u64,
}

impl TrafficSink {
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str, location: Coord, shape: MeshShape) -> Self {
        Self {
            entity: Rc::new(Entity::new(parent, name)),
            location,
            shape,
            num_received: 0,
            total_latency: 0,
            max_latency: 0,
        }
    }

    /// Receive a packet in cycle `tick`.
    pub fn receive(&mut self, tick: u64, packet: &Packet) -> SimResult {
        let dest = self.shape.decode(packet.destination());
        if dest != self.location {
            return sim_error!(format!(
                "{}: received {packet} addressed to {dest}",
                self.entity
            ));
        }
        enter!(self.entity ; packet.id());

        let latency = tick - packet.injected_tick();
        trace!(self.entity ; "received {packet} from {} after {latency} cycles", packet.source());
        self.num_received += 1;
        self.total_latency += latency;
        self.max_latency = self.max_latency.max(latency);
        Ok(())
    }

    #[must_use]
    pub fn num_received(&self) -> usize {
        self.num_received
    }

    /// Sum of the cycles between creation and delivery of every packet.
    #[must_use]
    pub fn total_latency(&self) -> u64 {
        self.total_latency
    }

    #[must_use]
    pub fn max_latency(&self) -> u64 {
        self.max_latency
    }
}
