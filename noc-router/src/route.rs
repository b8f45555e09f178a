// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Dimension-order route calculation.
//!
//! The route is a pure function of the router location and the destination
//! at the head of a buffer. The comparison of each axis gives an
//! [`Ordering`] and the pair of orderings indexes a table of output ports.

use std::cmp::Ordering;

use noc_engine::sim_error;
use noc_engine::types::SimError;
use serde::{Deserialize, Serialize};

use crate::packet::MeshShape;
use crate::types::{Coord, Mask, Port};

#[derive(clap::ValueEnum, Clone, Copy, Default, Debug, Serialize, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoutingAlgorithm {
    #[default]
    /// Resolve the X (column) offset first
    XFirst,

    /// Resolve the Y (row) offset first
    YFirst,
}

use crate::types::Port::{East as E, Local as L, North as N, South as S, West as W};

/// Indexed `[x ordering][y ordering]` with `Less, Equal, Greater` in that
/// order. The ordering is destination compared with location.
const X_FIRST: [[Port; 3]; 3] = [[W, W, W], [S, L, N], [E, E, E]];
const Y_FIRST: [[Port; 3]; 3] = [[S, W, N], [S, L, N], [S, E, N]];

fn table_index(ordering: Ordering) -> usize {
    (ordering as i8 + 1) as usize
}

#[derive(Clone, Debug)]
pub struct RouteCalculator {
    location: Coord,
    shape: MeshShape,
    table: &'static [[Port; 3]; 3],
}

impl RouteCalculator {
    pub fn new(
        location: Coord,
        shape: MeshShape,
        algorithm: RoutingAlgorithm,
    ) -> Result<Self, SimError> {
        if !shape.contains(location) {
            return sim_error!(format!(
                "Router location {location} is outside a {}x{} mesh",
                shape.num_columns(),
                shape.num_rows()
            ));
        }
        let table = match algorithm {
            RoutingAlgorithm::XFirst => &X_FIRST,
            RoutingAlgorithm::YFirst => &Y_FIRST,
        };
        Ok(Self {
            location,
            shape,
            table,
        })
    }

    #[must_use]
    pub fn location(&self) -> Coord {
        self.location
    }

    /// The output port for a destination coordinate.
    #[must_use]
    pub fn port_for(&self, dest: Coord) -> Port {
        let x = table_index(dest.x.cmp(&self.location.x));
        let y = table_index(dest.y.cmp(&self.location.y));
        self.table[x][y]
    }

    /// The one-hot output request for the destination field at a buffer head.
    ///
    /// Returns an empty mask when the head is not valid.
    #[must_use]
    pub fn route(&self, destination: u64, valid: bool) -> Mask {
        if !valid {
            return Mask::EMPTY;
        }
        self.port_for(self.shape.decode(destination)).mask()
    }
}
