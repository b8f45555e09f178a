// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A mesh of routers with traffic attached to every node.
//!
//! Routers are named `router_<x>_<y>`. Output `j` of a router drives input
//! `j.opposite()` of the neighbour in direction `j` and takes its enable from
//! that neighbour's `enable_out`. Ports on the edge of the mesh have no
//! neighbour: they receive nothing and their downstream is never ready.

use std::cell::RefCell;
use std::rc::Rc;

use noc_engine::traits::Clocked;
use noc_engine::types::{SimError, SimResult};
use noc_router::packet::{MeshShape, Packet};
use noc_router::router::Router;
use noc_router::types::{Coord, Flit, Mask, NUM_PORTS, Port};
use noc_track::entity::Entity;
use noc_track::{connect, debug, info};

use crate::config::SimConfig;
use crate::traffic::{TrafficSink, TrafficSource};

type PortData = [Option<Flit<Packet>>; NUM_PORTS];

struct Node {
    router: Router<Packet>,
    source: TrafficSource,
    sink: TrafficSink,

    /// The flits arriving at the router at the end of this cycle.
    arriving: PortData,

    /// Whether the source's packet was taken in this cycle.
    sent: bool,

    /// The packet leaving on the `Local` output in this cycle.
    delivered: Option<Packet>,
}

/// Delivery counts and latencies across the whole mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshSummary {
    pub num_delivered: usize,
    pub total_latency: u64,
    pub max_latency: u64,
}

impl MeshSummary {
    #[must_use]
    pub fn mean_latency(&self) -> f64 {
        if self.num_delivered == 0 {
            0.0
        } else {
            self.total_latency as f64 / self.num_delivered as f64
        }
    }
}

pub struct Mesh {
    pub entity: Rc<Entity>,
    shape: MeshShape,
    num_vcs: usize,
    nodes: RefCell<Vec<Node>>,
}

impl Mesh {
    /// Build every node of the mesh under `parent`.
    pub fn new(parent: &Rc<Entity>, config: &SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let shape = config.router.mesh_shape()?;
        let num_vcs = config.router.num_vcs;

        let mut nodes = Vec::new();
        for location in shape.coords() {
            let Coord { x, y } = location;
            let router = Router::new(parent, &format!("router_{x}_{y}"), location, &config.router)?;
            let source = TrafficSource::new(
                parent,
                &format!("source_{x}_{y}"),
                location,
                shape,
                num_vcs,
                config.injection_rate,
                config.packets_per_node,
                config.seed,
            );
            let sink = TrafficSink::new(parent, &format!("sink_{x}_{y}"), location, shape);
            connect!(source.entity ; router.entity);
            connect!(router.entity ; sink.entity);
            nodes.push(Node {
                router,
                source,
                sink,
                arriving: std::array::from_fn(|_| None),
                sent: false,
                delivered: None,
            });
        }

        let mesh = Self {
            entity: parent.clone(),
            shape,
            num_vcs,
            nodes: RefCell::new(nodes),
        };
        {
            let nodes = mesh.nodes.borrow();
            for (index, node) in nodes.iter().enumerate() {
                for port in Port::ALL {
                    if let Some(neighbour) = mesh.neighbour(index, port) {
                        connect!(node.router.entity ; nodes[neighbour].router.entity);
                    }
                }
            }
        }
        info!(mesh.entity ; "Built a {}x{} mesh with {} VCs",
            shape.num_columns(), shape.num_rows(), num_vcs);
        Ok(mesh)
    }

    #[must_use]
    pub fn shape(&self) -> MeshShape {
        self.shape
    }

    /// Index of the node in direction `port` from node `index`.
    #[must_use]
    pub fn neighbour(&self, index: usize, port: Port) -> Option<usize> {
        let columns = self.shape.num_columns() as usize;
        let rows = self.shape.num_rows() as usize;
        let (x, y) = (index % columns, index / columns);
        match port {
            Port::Local => None,
            Port::North => (y + 1 < rows).then(|| index + columns),
            Port::East => (x + 1 < columns).then(|| index + 1),
            Port::South => (y > 0).then(|| index - columns),
            Port::West => (x > 0).then(|| index - 1),
        }
    }

    /// Index of the node at `location`.
    #[must_use]
    pub fn index_of(&self, location: Coord) -> usize {
        (location.y * self.shape.num_columns() + location.x) as usize
    }

    #[must_use]
    pub fn num_to_send(&self) -> usize {
        self.nodes.borrow().iter().map(|n| n.source.num_to_send()).sum()
    }

    #[must_use]
    pub fn num_sent(&self) -> usize {
        self.nodes.borrow().iter().map(|n| n.source.num_sent()).sum()
    }

    #[must_use]
    pub fn num_delivered(&self) -> usize {
        self.nodes.borrow().iter().map(|n| n.sink.num_received()).sum()
    }

    /// True once every packet has been sent and delivered.
    #[must_use]
    pub fn is_done(&self) -> bool {
        let nodes = self.nodes.borrow();
        nodes.iter().all(|n| n.source.is_done() && n.router.is_idle())
            && self.num_delivered() == self.num_to_send()
    }

    #[must_use]
    pub fn summary(&self) -> MeshSummary {
        let nodes = self.nodes.borrow();
        MeshSummary {
            num_delivered: nodes.iter().map(|n| n.sink.num_received()).sum(),
            total_latency: nodes.iter().map(|n| n.sink.total_latency()).sum(),
            max_latency: nodes.iter().map(|n| n.sink.max_latency()).max().unwrap_or(0),
        }
    }

    /// Total values forwarded on each output port, across all routers.
    #[must_use]
    pub fn forwarded_per_port(&self) -> [u64; NUM_PORTS] {
        let mut totals = [0; NUM_PORTS];
        for node in self.nodes.borrow().iter() {
            for (total, forwarded) in totals.iter_mut().zip(node.router.stats().forwarded) {
                *total += forwarded;
            }
        }
        totals
    }

    pub fn log_stats(&self) {
        for node in self.nodes.borrow().iter() {
            node.router.log_stats();
        }
        debug!(self.entity ; "forwarded per port {:?}", self.forwarded_per_port());
    }
}

impl Clocked for Mesh {
    fn evaluate(&self, _tick: u64) -> SimResult {
        let mut nodes = self.nodes.borrow_mut();
        let num_nodes = nodes.len();

        let enable_out: Vec<[Mask; NUM_PORTS]> =
            nodes.iter().map(|n| n.router.enable_out()).collect();

        let mut outputs = Vec::with_capacity(num_nodes);
        for (index, node) in nodes.iter_mut().enumerate() {
            let enable_in: [Mask; NUM_PORTS] = std::array::from_fn(|j| {
                let port = Port::ALL[j];
                match port {
                    // The sink is always ready
                    Port::Local => Mask::all(self.num_vcs),
                    _ => match self.neighbour(index, port) {
                        Some(neighbour) => enable_out[neighbour][port.opposite().index()],
                        None => Mask::EMPTY,
                    },
                }
            });
            outputs.push(node.router.evaluate(&enable_in));
        }

        for index in 0..num_nodes {
            let mut arriving: PortData = std::array::from_fn(|_| None);
            for port in Port::ALL {
                arriving[port.index()] = match port {
                    Port::Local => {
                        let enable = enable_out[index][Port::Local.index()];
                        nodes[index].source.evaluate(enable)
                    }
                    _ => self.neighbour(index, port).and_then(|neighbour| {
                        outputs[neighbour].data[port.opposite().index()].take()
                    }),
                };
            }

            let node = &mut nodes[index];
            node.sent = arriving[Port::Local.index()].is_some();
            node.delivered = outputs[index].data[Port::Local.index()]
                .take()
                .map(|flit| flit.value);
            node.arriving = arriving;
        }
        Ok(())
    }

    fn update(&self, tick: u64) -> SimResult {
        for node in self.nodes.borrow_mut().iter_mut() {
            let arriving = std::mem::replace(&mut node.arriving, std::array::from_fn(|_| None));
            node.router.update(&arriving)?;
            node.source.update(tick, std::mem::take(&mut node.sent));
            if let Some(packet) = node.delivered.take() {
                node.sink.receive(tick, &packet)?;
            }
        }
        Ok(())
    }
}
