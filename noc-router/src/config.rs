// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Router configuration.

use noc_engine::sim_error;
use noc_engine::types::{SimError, SimResult};
use serde::{Deserialize, Serialize};

use crate::arbiter::ArbitrationPolicy;
use crate::packet::MeshShape;
use crate::route::RoutingAlgorithm;
use crate::switch_control::VcDequeue;
use crate::types::{MASK_BITS, NUM_PORTS};

/// Maximum number of virtual channels per physical port.
pub const MAX_VCS: usize = 8;

const _: () = assert!(NUM_PORTS * MAX_VCS <= MASK_BITS);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Number of columns (X) in the mesh. Must be a power of two.
    pub num_columns: u64,

    /// Number of rows (Y) in the mesh. Must be a power of two.
    pub num_rows: u64,

    /// Number of virtual channels on each port.
    pub num_vcs: usize,

    /// Entries in each input FIFO.
    pub buffer_depth: usize,

    pub routing: RoutingAlgorithm,
    pub arbitration: ArbitrationPolicy,
    pub vc_dequeue: VcDequeue,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            num_columns: 4,
            num_rows: 4,
            num_vcs: 1,
            buffer_depth: 4,
            routing: RoutingAlgorithm::default(),
            arbitration: ArbitrationPolicy::default(),
            vc_dequeue: VcDequeue::default(),
        }
    }
}

impl RouterConfig {
    pub fn validate(&self) -> SimResult {
        self.mesh_shape()?;
        if self.num_vcs == 0 || self.num_vcs > MAX_VCS {
            return sim_error!(format!(
                "Number of VCs ({}) must be between 1 and {MAX_VCS}",
                self.num_vcs
            ));
        }
        if self.buffer_depth == 0 {
            return sim_error!("Buffer depth must be at least 1");
        }
        Ok(())
    }

    pub fn mesh_shape(&self) -> Result<MeshShape, SimError> {
        MeshShape::new(self.num_columns, self.num_rows)
    }

    /// Number of arbitration requesters: one per input port and VC.
    #[must_use]
    pub fn num_requesters(&self) -> usize {
        NUM_PORTS * self.num_vcs
    }
}
