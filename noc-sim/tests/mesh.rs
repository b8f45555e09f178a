// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::rc::Rc;

use noc_engine::test_helpers::start_test;
use noc_engine::traits::Clocked;
use noc_router::config::RouterConfig;
use noc_router::route::RoutingAlgorithm;
use noc_router::switch_control::VcDequeue;
use noc_router::types::{Coord, Port};
use noc_sim::config::SimConfig;
use noc_sim::mesh::Mesh;

fn run_to_completion(config: &SimConfig) -> Rc<Mesh> {
    let mut engine = start_test(file!());
    let mesh = Rc::new(Mesh::new(engine.top(), config).unwrap());
    engine.register(mesh.clone());
    engine
        .run_until(config.max_cycles, || mesh.is_done())
        .unwrap();
    mesh
}

#[test]
fn neighbours() {
    let engine = start_test(file!());
    let mesh = Mesh::new(engine.top(), &SimConfig::default()).unwrap();

    let corner = mesh.index_of(Coord::new(0, 0));
    assert_eq!(mesh.neighbour(corner, Port::West), None);
    assert_eq!(mesh.neighbour(corner, Port::South), None);
    assert_eq!(mesh.neighbour(corner, Port::Local), None);
    assert_eq!(mesh.neighbour(corner, Port::East), Some(mesh.index_of(Coord::new(1, 0))));
    assert_eq!(mesh.neighbour(corner, Port::North), Some(mesh.index_of(Coord::new(0, 1))));

    let far = mesh.index_of(Coord::new(3, 3));
    assert_eq!(mesh.neighbour(far, Port::North), None);
    assert_eq!(mesh.neighbour(far, Port::East), None);

    // Links are symmetric
    for index in 0..16 {
        for port in Port::ALL {
            if let Some(neighbour) = mesh.neighbour(index, port) {
                assert_eq!(mesh.neighbour(neighbour, port.opposite()), Some(index));
            }
        }
    }
}

#[test]
fn all_packets_delivered() {
    let config = SimConfig {
        packets_per_node: 50,
        injection_rate: 0.2,
        max_cycles: 100_000,
        ..Default::default()
    };
    let mesh = run_to_completion(&config);

    assert_eq!(mesh.num_to_send(), 16 * 50);
    assert_eq!(mesh.num_sent(), 16 * 50);
    assert_eq!(mesh.num_delivered(), 16 * 50);

    let summary = mesh.summary();
    assert_eq!(summary.num_delivered, 16 * 50);
    assert!(summary.mean_latency() >= 1.0);
    assert!(summary.max_latency as f64 >= summary.mean_latency());

    // Every packet leaves the mesh through exactly one Local output
    assert_eq!(mesh.forwarded_per_port()[Port::Local.index()], 16 * 50);
}

#[test]
fn saturated_with_vcs() {
    let config = SimConfig {
        router: RouterConfig {
            num_columns: 8,
            num_rows: 2,
            num_vcs: 2,
            buffer_depth: 2,
            routing: RoutingAlgorithm::YFirst,
            vc_dequeue: VcDequeue::OnePerInput,
            ..Default::default()
        },
        packets_per_node: 40,
        injection_rate: 1.0,
        seed: 7,
        max_cycles: 100_000,
        ..Default::default()
    };
    let mesh = run_to_completion(&config);
    assert_eq!(mesh.num_delivered(), 16 * 40);
}

#[test]
fn single_node() {
    let config = SimConfig {
        router: RouterConfig {
            num_columns: 1,
            num_rows: 1,
            ..Default::default()
        },
        packets_per_node: 10,
        injection_rate: 0.5,
        max_cycles: 10_000,
        ..Default::default()
    };
    let mesh = run_to_completion(&config);
    assert_eq!(mesh.num_delivered(), 10);
    assert_eq!(mesh.forwarded_per_port(), [10, 0, 0, 0, 0]);
}

#[test]
fn deadlock_reported() {
    let config = SimConfig {
        packets_per_node: 1000,
        injection_rate: 1.0,
        max_cycles: 10,
        ..Default::default()
    };
    let mut engine = start_test(file!());
    let mesh = Rc::new(Mesh::new(engine.top(), &config).unwrap());
    engine.register(mesh.clone());
    let err = engine
        .run_until(config.max_cycles, || mesh.is_done())
        .unwrap_err();
    assert_eq!(err.0, "Deadlock: not finished after 10 cycles");
}

#[test]
fn deterministic() {
    let config = SimConfig {
        packets_per_node: 20,
        injection_rate: 0.3,
        seed: 42,
        ..Default::default()
    };
    let first = run_to_completion(&config).summary();
    let second = run_to_completion(&config).summary();
    assert_eq!(first, second);
}

#[test]
fn counters_move_on_clock_edge() {
    let config = SimConfig {
        router: RouterConfig {
            num_columns: 1,
            num_rows: 1,
            ..Default::default()
        },
        packets_per_node: 20,
        injection_rate: 1.0,
        ..Default::default()
    };
    let mut engine = start_test(file!());
    let mesh = Rc::new(Mesh::new(engine.top(), &config).unwrap());
    engine.register(mesh.clone());
    engine.run_cycles(5).unwrap();

    // One packet is sent and one delivered every cycle from the third cycle
    let tick = engine.clock().tick_now();
    let num_sent = mesh.num_sent();
    let summary = mesh.summary();
    assert_eq!(num_sent, 4);
    assert_eq!(summary.num_delivered, 3);

    mesh.evaluate(tick).unwrap();
    assert_eq!(mesh.num_sent(), num_sent);
    assert_eq!(mesh.summary(), summary);

    mesh.update(tick).unwrap();
    assert_eq!(mesh.num_sent(), num_sent + 1);
    assert_eq!(mesh.num_delivered(), summary.num_delivered + 1);
}
