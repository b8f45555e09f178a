// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Output valid and buffer dequeue enables derived from the grants.

use crate::types::{GrantMatrix, Mask, NUM_PORTS, Port};

/// `data_valid[j]` is set when output `j` has a grant.
#[must_use]
pub fn data_valid(grants: &GrantMatrix) -> [bool; NUM_PORTS] {
    std::array::from_fn(|j| grants.vector(Port::ALL[j]).any())
}

/// The requesters that are dequeued this cycle.
#[must_use]
pub fn dequeue_enables(grants: &GrantMatrix) -> Mask {
    Port::ALL
        .iter()
        .fold(Mask::EMPTY, |acc, port| acc | grants.vector(*port))
}

/// Dequeue enables per physical input: the OR across the input's VCs.
#[must_use]
pub fn port_dequeue_enables(grants: &GrantMatrix, num_vcs: usize) -> [bool; NUM_PORTS] {
    let dequeue = dequeue_enables(grants);
    std::array::from_fn(|i| (0..num_vcs).any(|vc| dequeue.is_set(i * num_vcs + vc)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enables() {
        let num_vcs = 2;
        let mut grants = GrantMatrix::new(NUM_PORTS * num_vcs);
        // North VC 1 to East, North VC 0 to Local
        grants.grant(Port::East, 3);
        grants.grant(Port::Local, 2);

        assert_eq!(data_valid(&grants), [true, false, true, false, false]);
        assert_eq!(dequeue_enables(&grants), Mask::from_bits(0b1100));
        assert_eq!(
            port_dequeue_enables(&grants, num_vcs),
            [false, true, false, false, false]
        );
    }

    #[test]
    fn no_grants() {
        let grants = GrantMatrix::new(NUM_PORTS);
        assert_eq!(data_valid(&grants), [false; NUM_PORTS]);
        assert!(dequeue_enables(&grants).is_empty());
    }
}
