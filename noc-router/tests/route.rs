// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use noc_router::packet::MeshShape;
use noc_router::route::{RouteCalculator, RoutingAlgorithm};
use noc_router::types::{Coord, Port};

fn x_first(at: Coord, dest: Coord) -> Port {
    if dest.x > at.x {
        Port::East
    } else if dest.x < at.x {
        Port::West
    } else if dest.y > at.y {
        Port::North
    } else if dest.y < at.y {
        Port::South
    } else {
        Port::Local
    }
}

fn y_first(at: Coord, dest: Coord) -> Port {
    if dest.y > at.y {
        Port::North
    } else if dest.y < at.y {
        Port::South
    } else if dest.x > at.x {
        Port::East
    } else if dest.x < at.x {
        Port::West
    } else {
        Port::Local
    }
}

fn check_all(algorithm: RoutingAlgorithm, expected: fn(Coord, Coord) -> Port) {
    let shape = MeshShape::new(4, 4).unwrap();
    for at in shape.coords() {
        let calc = RouteCalculator::new(at, shape, algorithm).unwrap();
        for dest in shape.coords() {
            let port = expected(at, dest);
            assert_eq!(calc.port_for(dest), port, "{at} -> {dest}");
            assert_eq!(calc.route(shape.encode(dest), true), port.mask());
        }
    }
}

#[test]
fn x_first_4x4() {
    check_all(RoutingAlgorithm::XFirst, x_first);
}

#[test]
fn y_first_4x4() {
    check_all(RoutingAlgorithm::YFirst, y_first);
}

#[test]
fn default_is_x_first() {
    assert_eq!(RoutingAlgorithm::default(), RoutingAlgorithm::XFirst);
}

#[test]
fn local_delivery() {
    let shape = MeshShape::new(4, 4).unwrap();
    let calc = RouteCalculator::new(Coord::new(1, 1), shape, RoutingAlgorithm::XFirst).unwrap();
    assert_eq!(calc.route(shape.encode(Coord::new(1, 1)), true), Port::Local.mask());
    assert_eq!(calc.route(shape.encode(Coord::new(3, 1)), true), Port::East.mask());
}

#[test]
fn invalid_head() {
    let shape = MeshShape::new(4, 4).unwrap();
    let calc = RouteCalculator::new(Coord::new(1, 1), shape, RoutingAlgorithm::XFirst).unwrap();
    for destination in 0..16 {
        assert!(calc.route(destination, false).is_empty());
    }
}

#[test]
fn rectangular_mesh() {
    let shape = MeshShape::new(8, 2).unwrap();
    let calc = RouteCalculator::new(Coord::new(5, 1), shape, RoutingAlgorithm::XFirst).unwrap();
    assert_eq!(calc.port_for(Coord::new(5, 0)), Port::South);
    assert_eq!(calc.port_for(Coord::new(7, 0)), Port::East);
    assert_eq!(calc.port_for(Coord::new(0, 1)), Port::West);
    assert_eq!(
        calc.route(shape.encode(Coord::new(5, 0)), true),
        Port::South.mask()
    );
}

#[test]
fn outside_mesh() {
    let shape = MeshShape::new(4, 4).unwrap();
    let err = RouteCalculator::new(Coord::new(4, 0), shape, RoutingAlgorithm::XFirst).unwrap_err();
    assert_eq!(err.0, "Router location (4,0) is outside a 4x4 mesh");
}
