// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Simulate a 2D mesh network-on-chip.
//!
//! The mesh is built of `num_columns x num_rows` routers. Each router is
//! wired to its neighbours and has a traffic source and sink attached to its
//! `Local` port. Every source sends `packets_per_node` packets to uniformly
//! random destinations and the simulation runs until every packet has been
//! delivered.
//!
//! # Examples
//!
//! ```txt
//! cargo run --bin noc-sim --release -- --num-columns 8 --num-rows 8 --injection-rate 0.2
//! ```
//!
//! Settings are taken from, lowest priority first: the defaults, an optional
//! TOML file (`--config`), `NOC_` environment variables and then the command
//! line. For example:
//! ```txt
//! NOC_ROUTER__NUM_VCS=2 cargo run --bin noc-sim -- --vc-dequeue one-per-input
//! ```
//!
//! # Diagram
//!
//! ```text
//!      (0,1)                        (1,1)
//!   +----------+                 +----------+
//!   |  Router  |<--- east/west -->|  Router  |
//!   +----------+                 +----------+
//!    ^   |  ^                     ^   |  ^
//!    |   v  |                     |   v  |
//!  Source Sink  north/south     Source Sink
//!               |                        |
//!               v                        v
//!            (0,0) ...               (1,0) ...
//! ```

pub mod config;
pub mod mesh;
pub mod traffic;
