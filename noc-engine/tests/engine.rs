// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use noc_engine::run_simulation;
use noc_engine::sim_error;
use noc_engine::test_helpers::start_test;
use noc_engine::traits::Clocked;
use noc_engine::types::SimResult;

/// A register whose output is only visible the cycle after it is written.
struct Register {
    current: Cell<u64>,
    next: Cell<u64>,
}

/// Reads the register every cycle and writes back the value plus one.
struct Incrementer {
    register: Rc<Register>,
    seen: RefCell<Vec<u64>>,
}

impl Clocked for Register {
    fn evaluate(&self, _tick: u64) -> SimResult {
        Ok(())
    }
    fn update(&self, _tick: u64) -> SimResult {
        self.current.set(self.next.get());
        Ok(())
    }
}

impl Clocked for Incrementer {
    fn evaluate(&self, _tick: u64) -> SimResult {
        let value = self.register.current.get();
        self.seen.borrow_mut().push(value);
        self.register.next.set(value + 1);
        Ok(())
    }
    fn update(&self, _tick: u64) -> SimResult {
        Ok(())
    }
}

fn build(engine: &mut noc_engine::engine::Engine, register_first: bool) -> Rc<Incrementer> {
    let register = Rc::new(Register {
        current: Cell::new(0),
        next: Cell::new(0),
    });
    let incrementer = Rc::new(Incrementer {
        register: register.clone(),
        seen: RefCell::new(Vec::new()),
    });
    if register_first {
        engine.register(register);
        engine.register(incrementer.clone());
    } else {
        engine.register(incrementer.clone());
        engine.register(register);
    }
    incrementer
}

#[test]
fn evaluate_before_update() {
    let mut engine = start_test(file!());
    let incrementer = build(&mut engine, true);
    run_simulation!(engine, 4);
    assert_eq!(*incrementer.seen.borrow(), vec![0, 1, 2, 3]);
    assert_eq!(engine.clock().tick_now(), 4);
}

#[test]
fn registration_order_irrelevant() {
    let mut engine = start_test(file!());
    let incrementer = build(&mut engine, false);
    run_simulation!(engine, 4);
    assert_eq!(*incrementer.seen.borrow(), vec![0, 1, 2, 3]);
}

#[test]
fn run_until_done() {
    let mut engine = start_test(file!());
    let incrementer = build(&mut engine, true);
    engine
        .run_until(100, || incrementer.seen.borrow().len() == 10)
        .unwrap();
    assert_eq!(engine.clock().tick_now(), 10);
}

#[test]
fn run_until_deadlock() {
    let mut engine = start_test(file!());
    let _incrementer = build(&mut engine, true);
    match engine.run_until(20, || false) {
        Ok(()) => panic!("Expected an error!"),
        Err(e) => assert_eq!(
            format!("{e}"),
            "Error: Deadlock: not finished after 20 cycles"
        ),
    }
    assert_eq!(engine.clock().tick_now(), 20);
}

struct FailAt {
    tick: u64,
}

impl Clocked for FailAt {
    fn evaluate(&self, tick: u64) -> SimResult {
        if tick == self.tick {
            return sim_error!(format!("failed at {tick}"));
        }
        Ok(())
    }
    fn update(&self, _tick: u64) -> SimResult {
        Ok(())
    }
}

#[test]
fn error_stops_simulation() {
    let mut engine = start_test(file!());
    engine.register(Rc::new(FailAt { tick: 3 }));
    run_simulation!(engine, 10, "Error: failed at 3");
    assert_eq!(engine.clock().tick_now(), 3);
}
