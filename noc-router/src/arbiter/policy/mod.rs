// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A collection of arbitration policies.

mod fixed_priority;
mod priority_round_robin;
mod round_robin;
mod weighted_round_robin;

pub use fixed_priority::FixedPriority;
pub use priority_round_robin::{Priority, PriorityRoundRobin};
pub use round_robin::RoundRobin;
pub use weighted_round_robin::WeightedRoundRobin;
