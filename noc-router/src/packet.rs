// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Packets and the packing of mesh coordinates into a destination field.
//!
//! The destination carried by a packet is split in two equal halves of
//! `coord_bits` each: X in the upper half and Y in the lower half.
//!
//! ```txt
//!   63         2*coord_bits     coord_bits          0
//!  +-------------+----------------+-----------------+
//!  |   ignored   |       X        |        Y        |
//!  +-------------+----------------+-----------------+
//! ```

use std::fmt;
use std::rc::Rc;

use noc_engine::sim_error;
use noc_engine::traits::{Routable, SimObject};
use noc_engine::types::SimError;
use noc_track::entity::Entity;
use noc_track::{Id, Unique, create, create_id};

use crate::types::Coord;

/// Widest coordinate supported by a 64-bit destination field.
pub const MAX_COORD_BITS: u32 = 32;

/// The dimensions of a mesh and the width of each coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshShape {
    num_columns: u64,
    num_rows: u64,
    coord_bits: u32,
}

impl MeshShape {
    /// Create a mesh shape.
    ///
    /// Both axes must have a power-of-two number of nodes so that a
    /// coordinate is a fixed bit-slice of the destination.
    pub fn new(num_columns: u64, num_rows: u64) -> Result<Self, SimError> {
        for (axis, count) in [("columns", num_columns), ("rows", num_rows)] {
            if count == 0 {
                return sim_error!(format!("Mesh must have at least one node in {axis}"));
            }
            if !count.is_power_of_two() {
                return sim_error!(format!(
                    "Number of {axis} ({count}) is not a power of two"
                ));
            }
        }

        let coord_bits = num_columns
            .trailing_zeros()
            .max(num_rows.trailing_zeros());
        if coord_bits > MAX_COORD_BITS {
            return sim_error!(format!(
                "Coordinates of {coord_bits} bits do not fit in a destination"
            ));
        }

        Ok(Self {
            num_columns,
            num_rows,
            coord_bits,
        })
    }

    #[must_use]
    pub fn num_columns(&self) -> u64 {
        self.num_columns
    }

    #[must_use]
    pub fn num_rows(&self) -> u64 {
        self.num_rows
    }

    #[must_use]
    pub fn num_nodes(&self) -> u64 {
        self.num_columns * self.num_rows
    }

    /// Width of each coordinate within the destination field.
    #[must_use]
    pub fn coord_bits(&self) -> u32 {
        self.coord_bits
    }

    /// Total number of meaningful destination bits.
    #[must_use]
    pub fn destination_bits(&self) -> u32 {
        2 * self.coord_bits
    }

    #[must_use]
    pub fn contains(&self, coord: Coord) -> bool {
        coord.x < self.num_columns && coord.y < self.num_rows
    }

    #[must_use]
    pub fn encode(&self, coord: Coord) -> u64 {
        (coord.x << self.coord_bits) | (coord.y & self.coord_mask())
    }

    /// Split a destination field into its coordinates.
    ///
    /// Any bits above the two coordinates are ignored.
    #[must_use]
    pub fn decode(&self, destination: u64) -> Coord {
        let mask = self.coord_mask();
        Coord {
            x: (destination >> self.coord_bits) & mask,
            y: destination & mask,
        }
    }

    /// Iterate over all coordinates in the mesh in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + use<> {
        let num_columns = self.num_columns;
        (0..self.num_rows).flat_map(move |y| (0..num_columns).map(move |x| Coord::new(x, y)))
    }

    fn coord_mask(&self) -> u64 {
        (1u64 << self.coord_bits) - 1
    }
}

/// The object routed through the mesh.
#[derive(Clone, Debug)]
pub struct Packet {
    id: Id,
    destination: u64,
    payload: u64,
    source: Coord,
    injected_tick: u64,
}

impl Packet {
    /// Create a new packet, tracking its creation against `created_by`.
    #[must_use]
    pub fn new(created_by: &Rc<Entity>, destination: u64) -> Self {
        let packet = Self {
            id: create_id!(created_by),
            destination,
            payload: 0,
            source: Coord::default(),
            injected_tick: 0,
        };
        create!(created_by ; packet, 0);
        packet
    }

    #[must_use]
    pub fn with_payload(mut self, payload: u64) -> Self {
        self.payload = payload;
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: Coord) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn with_injected_tick(mut self, tick: u64) -> Self {
        self.injected_tick = tick;
        self
    }

    #[must_use]
    pub fn payload(&self) -> u64 {
        self.payload
    }

    #[must_use]
    pub fn source(&self) -> Coord {
        self.source
    }

    /// Cycle in which the packet was offered to the network.
    #[must_use]
    pub fn injected_tick(&self) -> u64 {
        self.injected_tick
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl Routable for Packet {
    fn destination(&self) -> u64 {
        self.destination
    }
}

impl Unique for Packet {
    fn id(&self) -> Id {
        self.id
    }
}

impl SimObject for Packet {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode() {
        let shape = MeshShape::new(4, 4).unwrap();
        assert_eq!(shape.coord_bits(), 2);
        assert_eq!(shape.destination_bits(), 4);
        assert_eq!(shape.encode(Coord::new(3, 1)), 0b1101);
        assert_eq!(shape.decode(0b1101), Coord::new(3, 1));
    }

    #[test]
    fn upper_bits_ignored() {
        let shape = MeshShape::new(4, 4).unwrap();
        assert_eq!(shape.decode(0xff00 | 0b0110), Coord::new(1, 2));
    }

    #[test]
    fn rectangular() {
        let shape = MeshShape::new(8, 2).unwrap();
        assert_eq!(shape.coord_bits(), 3);
        assert_eq!(shape.destination_bits(), 6);
        assert_eq!(shape.num_nodes(), 16);
        assert_eq!(shape.encode(Coord::new(5, 1)), 0b101_001);
        assert!(shape.contains(Coord::new(7, 1)));
        assert!(!shape.contains(Coord::new(1, 2)));
        assert_eq!(shape.coords().count(), 16);
        for coord in shape.coords() {
            assert_eq!(shape.decode(shape.encode(coord)), coord);
        }
    }

    #[test]
    fn single_node() {
        let shape = MeshShape::new(1, 1).unwrap();
        assert_eq!(shape.coord_bits(), 0);
        assert_eq!(shape.decode(0x1234), Coord::new(0, 0));
    }

    #[test]
    fn not_power_of_two() {
        let err = MeshShape::new(3, 4).unwrap_err();
        assert_eq!(err.0, "Number of columns (3) is not a power of two");
        let err = MeshShape::new(4, 0).unwrap_err();
        assert_eq!(err.0, "Mesh must have at least one node in rows");
    }
}
