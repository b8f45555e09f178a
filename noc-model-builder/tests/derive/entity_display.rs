// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::rc::Rc;

use noc_model_builder::EntityDisplay;
use noc_track::entity::{Entity, toplevel};
use noc_track::tracker::dev_null_tracker;

#[derive(EntityDisplay)]
struct Block<T> {
    entity: Rc<Entity>,
    _value: T,
}

fn main() {
    let tracker = dev_null_tracker();
    let top = toplevel(&tracker, "top");
    let block = Block {
        entity: Rc::new(Entity::new(&top, "block")),
        _value: 3_u32,
    };
    assert_eq!(format!("{block}"), "top::block");
}
