// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use noc_engine::test_helpers::start_test;
use noc_router::config::RouterConfig;
use noc_router::output::{dequeue_enables, port_dequeue_enables};
use noc_router::switch_control::{SwitchControl, VcDequeue};
use noc_router::types::{Mask, NUM_PORTS, Port, RequestMatrix, requester_index};

fn config(num_vcs: usize, vc_dequeue: VcDequeue) -> RouterConfig {
    RouterConfig {
        num_vcs,
        vc_dequeue,
        ..Default::default()
    }
}

fn request(requests: &mut RequestMatrix, input: Port, vc: usize, num_vcs: usize, output: Port) {
    requests.set_row(requester_index(input, vc, num_vcs), output.mask());
}

#[test]
fn masked_by_enable() {
    let engine = start_test(file!());
    let mut switch = SwitchControl::new(engine.top(), &config(1, VcDequeue::Independent)).unwrap();

    let mut requests = RequestMatrix::new(NUM_PORTS);
    request(&mut requests, Port::North, 0, 1, Port::East);
    request(&mut requests, Port::West, 0, 1, Port::East);
    request(&mut requests, Port::Local, 0, 1, Port::South);

    let mut enable_in = [Mask::all(1); NUM_PORTS];
    enable_in[Port::South.index()] = Mask::EMPTY;

    let grants = switch.arbitrate(&requests, &enable_in);
    assert_eq!(grants.granted(Port::East), Some(Port::North.index()));
    assert_eq!(grants.granted(Port::South), None);
    assert!(grants.is_output_exclusive());

    // The same requests next cycle move the East grant on
    let grants = switch.arbitrate(&requests, &enable_in);
    assert_eq!(grants.granted(Port::East), Some(Port::West.index()));
    assert_eq!(grants.granted(Port::South), None);
}

#[test]
fn all_inputs_to_one_output() {
    let engine = start_test(file!());
    let mut switch = SwitchControl::new(engine.top(), &config(1, VcDequeue::Independent)).unwrap();

    let mut requests = RequestMatrix::new(NUM_PORTS);
    for input in Port::ALL {
        request(&mut requests, input, 0, 1, Port::Local);
    }
    let enable_in = [Mask::all(1); NUM_PORTS];

    let mut winners = Vec::new();
    for _ in 0..NUM_PORTS {
        let grants = switch.arbitrate(&requests, &enable_in);
        assert!(grants.is_output_exclusive());
        assert_eq!(grants.iter().count(), 1);
        winners.push(grants.granted(Port::Local).unwrap());
    }
    assert_eq!(winners, vec![0, 1, 2, 3, 4]);
}

#[test]
fn enable_per_vc() {
    let engine = start_test(file!());
    let num_vcs = 2;
    let mut switch =
        SwitchControl::new(engine.top(), &config(num_vcs, VcDequeue::Independent)).unwrap();

    let mut requests = RequestMatrix::new(NUM_PORTS * num_vcs);
    request(&mut requests, Port::North, 1, num_vcs, Port::East);

    let mut enable_in = [Mask::all(num_vcs); NUM_PORTS];
    enable_in[Port::East.index()] = Mask::bit(0);
    let grants = switch.arbitrate(&requests, &enable_in);
    assert!(!grants.any());

    enable_in[Port::East.index()] = Mask::bit(1);
    let grants = switch.arbitrate(&requests, &enable_in);
    assert_eq!(
        grants.granted(Port::East),
        Some(requester_index(Port::North, 1, num_vcs))
    );
}

fn two_vcs_two_outputs(num_vcs: usize) -> RequestMatrix {
    let mut requests = RequestMatrix::new(NUM_PORTS * num_vcs);
    request(&mut requests, Port::North, 0, num_vcs, Port::East);
    request(&mut requests, Port::North, 1, num_vcs, Port::Local);
    requests
}

#[test]
fn independent_vcs() {
    let engine = start_test(file!());
    let num_vcs = 2;
    let mut switch =
        SwitchControl::new(engine.top(), &config(num_vcs, VcDequeue::Independent)).unwrap();

    let requests = two_vcs_two_outputs(num_vcs);
    let enable_in = [Mask::all(num_vcs); NUM_PORTS];
    let grants = switch.arbitrate(&requests, &enable_in);

    let vc0 = requester_index(Port::North, 0, num_vcs);
    let vc1 = requester_index(Port::North, 1, num_vcs);
    assert_eq!(grants.granted(Port::East), Some(vc0));
    assert_eq!(grants.granted(Port::Local), Some(vc1));
    assert_eq!(dequeue_enables(&grants), Mask::bit(vc0) | Mask::bit(vc1));
    assert_eq!(
        port_dequeue_enables(&grants, num_vcs),
        [false, true, false, false, false]
    );
}

#[test]
fn one_vc_per_input() {
    let engine = start_test(file!());
    let num_vcs = 2;
    let mut switch =
        SwitchControl::new(engine.top(), &config(num_vcs, VcDequeue::OnePerInput)).unwrap();
    assert_eq!(switch.vc_dequeue(), VcDequeue::OnePerInput);

    let requests = two_vcs_two_outputs(num_vcs);
    let enable_in = [Mask::all(num_vcs); NUM_PORTS];

    let vc0 = requester_index(Port::North, 0, num_vcs);
    let vc1 = requester_index(Port::North, 1, num_vcs);
    for expected in [vc0, vc1, vc0, vc1] {
        let grants = switch.arbitrate(&requests, &enable_in);
        assert_eq!(grants.iter().count(), 1);
        assert_eq!(dequeue_enables(&grants), Mask::bit(expected));
    }
}

#[test]
fn nominated_vc_kept_until_granted() {
    let engine = start_test(file!());
    let num_vcs = 2;
    let mut switch =
        SwitchControl::new(engine.top(), &config(num_vcs, VcDequeue::OnePerInput)).unwrap();

    let mut requests = two_vcs_two_outputs(num_vcs);
    request(&mut requests, Port::Local, 0, num_vcs, Port::East);
    let enable_in = [Mask::all(num_vcs); NUM_PORTS];

    let local = requester_index(Port::Local, 0, num_vcs);
    let north_vc0 = requester_index(Port::North, 0, num_vcs);
    let north_vc1 = requester_index(Port::North, 1, num_vcs);

    // North nominates VC 0 but loses East to Local
    let grants = switch.arbitrate(&requests, &enable_in);
    assert_eq!(grants.granted(Port::East), Some(local));
    assert_eq!(grants.granted(Port::Local), None);

    // North still nominates VC 0 and now wins
    let grants = switch.arbitrate(&requests, &enable_in);
    assert_eq!(grants.granted(Port::East), Some(north_vc0));
    assert_eq!(grants.granted(Port::Local), None);

    // Then VC 1 gets its turn
    let grants = switch.arbitrate(&requests, &enable_in);
    assert_eq!(grants.granted(Port::East), Some(local));
    assert_eq!(grants.granted(Port::Local), Some(north_vc1));
}
