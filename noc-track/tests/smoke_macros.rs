// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Ensure that all version of each macro can be used

use std::rc::Rc;

use noc_track::entity::{Entity, toplevel};
use noc_track::{
    Id, connect, create, create_id, debug, enter, error, exit, info, set_time, test_helpers,
    test_init, trace, value, warn,
};

macro_rules! build_with_entity {
    ($name:ident, $macro:ident, $slvl:expr) => (
        #[test]
        fn $name() {
            let (test_tracker, tracker) = test_init!(100);

            let top = toplevel(&tracker, "top");
            test_helpers::check_and_clear(&test_tracker, &["0: created 100, top, 0 bytes"]);
            assert_eq!(top.id, Id(100));

            $macro!(top ; "Loc with no args");
            test_helpers::check_and_clear(&test_tracker, &[concat!("100:", $slvl, ": Loc with no args")]);

            $macro!(top ; "Loc with {} argument", 1);
            test_helpers::check_and_clear(&test_tracker, &[concat!("100:", $slvl, ": Loc with 1 argument")]);

            $macro!(top ; "Loc with {}, {} arguments", 1, 1 + 1);
            test_helpers::check_and_clear(&test_tracker, &[concat!("100:", $slvl,": Loc with 1, 2 arguments")]);

            drop(top);
            test_helpers::check_and_clear(&test_tracker, &["0: destroyed 100"]);
        }
    );
}

build_with_entity!(trace_with_entity, trace, "TRACE");
build_with_entity!(info_with_entity, info, "INFO");
build_with_entity!(debug_with_entity, debug, "DEBUG");
build_with_entity!(warn_with_entity, warn, "WARN");
build_with_entity!(error_with_entity, error, "ERROR");

#[test]
fn child_create_destroy() {
    let (test_tracker, tracker) = test_init!(10);

    let top = toplevel(&tracker, "top");
    let child = Entity::new(&top, "router");
    test_helpers::check_and_clear(
        &test_tracker,
        &[
            "0: created 10, top, 0 bytes",
            "10: created 11, top::router, 0 bytes",
        ],
    );

    drop(child);
    test_helpers::check_and_clear(&test_tracker, &["10: destroyed 11"]);
}

#[test]
fn enter_exit_basics() {
    let (test_tracker, tracker) = test_init!(40);

    let top = toplevel(&tracker, "top");
    let obj = create_id!(top);
    enter!(top ; obj);
    exit!(top ; obj);
    test_helpers::check_and_clear(
        &test_tracker,
        &["0: created 40, top, 0 bytes", "40: 41 entered", "40: 41 exited"],
    );
}

#[test]
fn create_object() {
    let (test_tracker, tracker) = test_init!(50);

    let top = toplevel(&tracker, "top");
    let obj = create_id!(top);
    create!(top ; obj, 16);
    test_helpers::check_and_clear(
        &test_tracker,
        &["0: created 50, top, 0 bytes", "50: created 51, 51, 16 bytes"],
    );
}

#[test]
fn connect_value_time() {
    let (test_tracker, tracker) = test_init!(60);

    let top = toplevel(&tracker, "top");
    let a = Rc::new(Entity::new(&top, "a"));
    let b = Rc::new(Entity::new(&top, "b"));
    test_helpers::check_and_clear(
        &test_tracker,
        &[
            "0: created 60, top, 0 bytes",
            "60: created 61, top::a, 0 bytes",
            "60: created 62, top::b, 0 bytes",
        ],
    );

    connect!(a ; b);
    value!(a ; 3);
    set_time!(top ; 1.5);
    test_helpers::check_and_clear(
        &test_tracker,
        &["61: connect to 62", "61: value 3", "60: set time 1.5ns"],
    );
}
