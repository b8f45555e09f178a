// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Simulate a 2D mesh network-on-chip.
//!
//! See `lib.rs` for details.

use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use noc_engine::engine::Engine;
use noc_engine::types::{SimError, SimResult};
use noc_sim::config::{Cli, SimConfig, load_config};
use noc_sim::mesh::Mesh;
use noc_track::builder::setup_trackers;
use noc_track::entity::toplevel;
use noc_track::tracker::stdout_tracker;
use noc_track::{Tracker, error, info};

fn run(engine: &mut Engine, config: &SimConfig) -> SimResult {
    let top = engine.top().clone();
    let mesh = Rc::new(Mesh::new(&top, config)?);
    engine.register(mesh.clone());

    info!(top ;
        "Each of {} nodes sending {} packets at injection rate {}",
        mesh.shape().num_nodes(),
        config.packets_per_node,
        config.injection_rate
    );

    engine.run_until(config.max_cycles, || mesh.is_done())?;

    let cycles = engine.clock().tick_now();
    let summary = mesh.summary();
    let num_nodes = mesh.shape().num_nodes();
    let throughput = if cycles == 0 {
        0.0
    } else {
        summary.num_delivered as f64 / (cycles as f64 * num_nodes as f64)
    };
    mesh.log_stats();
    info!(top ;
        "Delivered {} packets in {} cycles ({:.1}ns): {:.4} packets/node/cycle",
        summary.num_delivered,
        cycles,
        engine.time_now_ns(),
        throughput
    );
    info!(top ;
        "Latency: mean {:.2} cycles, max {} cycles",
        summary.mean_latency(),
        summary.max_latency
    );
    Ok(())
}

/// Report an error that happened before the trackers were configured.
fn report_early_error(message: &str) -> ExitCode {
    let tracker = stdout_tracker(log::Level::Error);
    let top = toplevel(&tracker, "top");
    error!(top ; "{message}");
    tracker.shutdown();
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref(), &cli) {
        Ok(config) => config,
        Err(e) => return report_early_error(&e.to_string()),
    };

    let tracker: Tracker = match setup_trackers(&config.tracking.trackers_config()) {
        Ok(tracker) => tracker,
        Err(e) => return report_early_error(&SimError(e.to_string()).to_string()),
    };

    let mut engine = Engine::new(&tracker);
    let result = run(&mut engine, &config);
    let exit_code = match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(engine.top() ; "{e}");
            ExitCode::FAILURE
        }
    };
    tracker.shutdown();
    exit_code
}
