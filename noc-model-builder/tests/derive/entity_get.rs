// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::rc::Rc;

use noc_model_builder::EntityGet;
use noc_track::entity::{Entity, GetEntity, toplevel};
use noc_track::tracker::dev_null_tracker;

#[derive(EntityGet)]
struct Block {
    entity: Rc<Entity>,
}

fn main() {
    let tracker = dev_null_tracker();
    let top = toplevel(&tracker, "top");
    let block = Block {
        entity: Rc::new(Entity::new(&top, "block")),
    };
    assert_eq!(block.entity().full_name(), "top::block");
}
