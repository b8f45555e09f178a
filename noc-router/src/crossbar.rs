// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The crossbar: grant-driven selection of buffer heads.

use crate::types::{Flit, GrantMatrix, NUM_PORTS, Port, requester_port_vc};

/// Select the head of the granted requester for every output.
///
/// `heads` is indexed by requester. Outputs without a grant are `None`.
///
/// **Panics** if a requester is granted without a value at its head.
#[must_use]
pub fn switch<T: Clone>(
    grants: &GrantMatrix,
    heads: &[Option<&T>],
    num_vcs: usize,
) -> [Option<Flit<T>>; NUM_PORTS] {
    std::array::from_fn(|j| {
        grants.granted(Port::ALL[j]).map(|requester| match heads[requester] {
            Some(value) => {
                let (_, vc) = requester_port_vc(requester, num_vcs);
                Flit::new(vc, value.clone())
            }
            None => panic!("grant to requester {requester} without a packet"),
        })
    })
}
