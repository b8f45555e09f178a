// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A cycle-level model of a single router in a 2D mesh network-on-chip.
//!
//! The [router](crate::router::Router) has five ports
//! ([`Local`](crate::types::Port::Local), `North`, `East`, `South` and
//! `West`). Each input port is buffered by one FIFO per virtual channel and
//! the router forwards packets using wormhole switching:
//!
//! ```txt
//!            +-------------------------------------------------------+
//!            |                        ROUTER                         |
//!            |                                                       |
//!  rx[port] -> BUFFER[port][vc] -> ROUTE ---+                        |
//!            |        |                     | requests               |
//!            |        |              SWITCH CONTROL <- enable_in[port]
//!            |        |                     | grants                 |
//!            |        +---------------> CROSSBAR ----------------> tx[port]
//!            |                                                       |
//!  enable_out[port] <- not full                                      |
//!            +-------------------------------------------------------+
//! ```
//!
//! Within a cycle the causal order is fixed: buffer heads, then route
//! requests, then arbitration, then grants, then the crossbar outputs and the
//! dequeue enables. Buffers are only popped and pushed at the clock edge so a
//! packet accepted in one cycle can leave at the earliest in the next.
//!
//! The components are usable on their own:
//!  - [buffer](crate::buffer): input FIFOs and their flow-control.
//!  - [route](crate::route): dimension-order route calculation.
//!  - [switch_control](crate::switch_control): output-exclusive arbitration
//!    using any [arbitration policy](crate::arbiter).
//!  - [crossbar](crate::crossbar): grant-driven selection of packets.
//!  - [output](crate::output): valid and dequeue enables.

pub mod arbiter;
pub mod buffer;
pub mod config;
pub mod crossbar;
pub mod output;
pub mod packet;
pub mod route;
pub mod router;
pub mod switch_control;
pub mod types;
