// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Shared router types.
//!
//! Requests and grants are kept in two distinct tables:
//!  - [`RequestMatrix`] is indexed `[requester][output]`.
//!  - [`GrantMatrix`] is indexed `[output][requester]`.
//!
//! [`RequestMatrix::column`] is the only conversion between the two views.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use itertools::Itertools;

/// Number of ports on every router.
pub const NUM_PORTS: usize = 5;

/// Maximum number of bits held in a [`Mask`].
pub const MASK_BITS: usize = u64::BITS as usize;

/// The five router ports, indexed in the same order for inputs and outputs.
#[repr(usize)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Port {
    /// Core-facing port.
    Local = 0,
    North,
    East,
    South,
    West,
}

impl Port {
    pub const ALL: [Port; NUM_PORTS] = [
        Port::Local,
        Port::North,
        Port::East,
        Port::South,
        Port::West,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Port> {
        Self::ALL.get(index).copied()
    }

    /// The port of a neighbouring router that this port is wired to.
    #[must_use]
    pub const fn opposite(self) -> Port {
        match self {
            Port::Local => Port::Local,
            Port::North => Port::South,
            Port::East => Port::West,
            Port::South => Port::North,
            Port::West => Port::East,
        }
    }

    /// A [`Mask`] with only the bit for this port set.
    #[must_use]
    pub fn mask(self) -> Mask {
        Mask::bit(self.index())
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // For to_string() use a name in the form of other entities
        let name = match self {
            Port::Local => "local",
            Port::North => "north",
            Port::East => "east",
            Port::South => "south",
            Port::West => "west",
        };
        write!(f, "{name}")
    }
}

/// A mesh coordinate. `x` grows towards East and `y` grows towards North.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Coord {
    pub x: u64,
    pub y: u64,
}

impl Coord {
    #[must_use]
    pub const fn new(x: u64, y: u64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// A fixed-width bit vector.
///
/// Used for request rows (bit per output port), grant vectors (bit per
/// requester) and enables (bit per virtual channel).
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Mask(u64);

impl Mask {
    pub const EMPTY: Mask = Mask(0);

    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// A mask with only bit `index` set.
    ///
    /// **Panics** if `index` does not fit in a mask.
    #[must_use]
    pub fn bit(index: usize) -> Self {
        assert!(index < MASK_BITS, "bit {index} out of range for a mask");
        Self(1 << index)
    }

    /// A mask with the lowest `width` bits set.
    #[must_use]
    pub fn all(width: usize) -> Self {
        if width >= MASK_BITS {
            Self(u64::MAX)
        } else {
            Self((1 << width) - 1)
        }
    }

    #[must_use]
    pub fn is_set(self, index: usize) -> bool {
        index < MASK_BITS && (self.0 >> index) & 1 == 1
    }

    pub fn set(&mut self, index: usize) {
        *self |= Mask::bit(index);
    }

    pub fn clear(&mut self, index: usize) {
        self.0 &= !Mask::bit(index).0;
    }

    #[must_use]
    pub fn any(self) -> bool {
        self.0 != 0
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    #[must_use]
    pub fn is_one_hot_or_zero(self) -> bool {
        self.0 & self.0.wrapping_sub(1) == 0
    }

    /// Index of the lowest set bit.
    #[must_use]
    pub fn first(self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(self.0.trailing_zeros() as usize)
        }
    }

    /// Iterate over the indices of the set bits, lowest first.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        let mut remaining = self.0;
        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            let index = remaining.trailing_zeros() as usize;
            remaining &= remaining - 1;
            Some(index)
        })
    }
}

impl BitOr for Mask {
    type Output = Mask;
    fn bitor(self, rhs: Self) -> Self::Output {
        Mask(self.0 | rhs.0)
    }
}

impl BitOrAssign for Mask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Mask {
    type Output = Mask;
    fn bitand(self, rhs: Self) -> Self::Output {
        Mask(self.0 & rhs.0)
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:#b}", self.0)
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:#b}", self.0)
    }
}

/// Index of the requester for virtual channel `vc` of input `port`.
#[must_use]
pub fn requester_index(port: Port, vc: usize, num_vcs: usize) -> usize {
    port.index() * num_vcs + vc
}

/// The input port and virtual channel of a requester.
///
/// **Panics** if `requester` is beyond the last input port.
#[must_use]
pub fn requester_port_vc(requester: usize, num_vcs: usize) -> (Port, usize) {
    (Port::ALL[requester / num_vcs], requester % num_vcs)
}

/// Output requests indexed `[requester][output]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestMatrix {
    rows: Vec<Mask>,
}

impl RequestMatrix {
    #[must_use]
    pub fn new(num_requesters: usize) -> Self {
        assert!(
            num_requesters <= MASK_BITS,
            "{num_requesters} requesters do not fit in a grant vector"
        );
        Self {
            rows: vec![Mask::EMPTY; num_requesters],
        }
    }

    #[must_use]
    pub fn num_requesters(&self) -> usize {
        self.rows.len()
    }

    /// The outputs wanted by `requester`.
    #[must_use]
    pub fn row(&self, requester: usize) -> Mask {
        self.rows[requester]
    }

    pub fn set_row(&mut self, requester: usize, outputs: Mask) {
        self.rows[requester] = outputs;
    }

    /// The requesters that want `output`: the transpose of one column.
    #[must_use]
    pub fn column(&self, output: Port) -> Mask {
        let mut requesters = Mask::EMPTY;
        for (requester, row) in self.rows.iter().enumerate() {
            if row.is_set(output.index()) {
                requesters.set(requester);
            }
        }
        requesters
    }
}

/// One-hot grant vectors indexed `[output][requester]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrantMatrix {
    num_requesters: usize,
    vectors: [Mask; NUM_PORTS],
}

impl GrantMatrix {
    #[must_use]
    pub fn new(num_requesters: usize) -> Self {
        Self {
            num_requesters,
            vectors: [Mask::EMPTY; NUM_PORTS],
        }
    }

    #[must_use]
    pub fn num_requesters(&self) -> usize {
        self.num_requesters
    }

    /// Grant `output` to `requester`.
    ///
    /// **Panics** if `output` has already been granted this cycle.
    pub fn grant(&mut self, output: Port, requester: usize) {
        assert!(
            requester < self.num_requesters,
            "requester {requester} out of range"
        );
        assert!(
            self.vectors[output.index()].is_empty(),
            "{output} granted twice in one cycle"
        );
        self.vectors[output.index()] = Mask::bit(requester);
    }

    /// The grant vector for `output`.
    #[must_use]
    pub fn vector(&self, output: Port) -> Mask {
        self.vectors[output.index()]
    }

    /// The requester granted `output`, if any.
    #[must_use]
    pub fn granted(&self, output: Port) -> Option<usize> {
        self.vectors[output.index()].first()
    }

    #[must_use]
    pub fn any(&self) -> bool {
        self.vectors.iter().any(|v| v.any())
    }

    /// True if no output has more than one grant.
    #[must_use]
    pub fn is_output_exclusive(&self) -> bool {
        self.vectors.iter().all(|v| v.is_one_hot_or_zero())
    }

    /// Iterate over `(output, requester)` for every grant.
    pub fn iter(&self) -> impl Iterator<Item = (Port, usize)> + '_ {
        Port::ALL
            .iter()
            .filter_map(|port| self.granted(*port).map(|requester| (*port, requester)))
    }
}

impl fmt::Display for GrantMatrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let grants = self
            .iter()
            .map(|(port, requester)| format!("{port}<-{requester}"))
            .join(", ");
        write!(f, "[{grants}]")
    }
}

/// The unit carried by a link in one cycle: an object and its virtual
/// channel.
#[derive(Clone, Debug, PartialEq)]
pub struct Flit<T> {
    pub vc: usize,
    pub value: T,
}

impl<T> Flit<T> {
    #[must_use]
    pub fn new(vc: usize, value: T) -> Self {
        Self { vc, value }
    }
}

impl<T: fmt::Display> fmt::Display for Flit<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}@vc{}", self.value, self.vc)
    }
}
