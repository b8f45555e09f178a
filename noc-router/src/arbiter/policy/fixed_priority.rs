// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Fixed priority arbitration policy
//!
//! The lowest requesting index always wins. A requester can be starved
//! indefinitely by any lower index that keeps requesting.

use std::rc::Rc;

use noc_track::entity::Entity;

use crate::arbiter::Arbitrate;
use crate::types::Mask;

#[derive(Default)]
pub struct FixedPriority {}

impl FixedPriority {
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }
}

impl Arbitrate for FixedPriority {
    fn arbitrate(&mut self, _entity: &Rc<Entity>, requests: Mask) -> Option<usize> {
        requests.first()
    }
}
