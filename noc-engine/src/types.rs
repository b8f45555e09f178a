// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Shared types.

use std::error::Error;
use std::fmt;
use std::rc::Rc;

use crate::traits::Clocked;

/// The type of a component that can be registered with the `Engine` so that it
/// will be evaluated and clocked every cycle.
pub type Component = Rc<dyn Clocked + 'static>;

// Simulation errors

#[macro_export]
/// Build a [SimError] from a message that supports `to_string`
macro_rules! sim_error {
    ($msg:expr) => {
        Err($crate::types::SimError($msg.to_string()))
    };
}

/// The `SimError` is what should be returned in the case of an error
#[derive(Debug, Clone, PartialEq)]
pub struct SimError(pub String);

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Error: {}", self.0)
    }
}

impl Error for SimError {}

/// The SimResult is the return type for most simulation functions
pub type SimResult = Result<(), SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn fails() -> SimResult {
        sim_error!("buffer overflow")
    }

    #[test]
    fn error_display() {
        let err = fails().unwrap_err();
        assert_eq!(format!("{err}"), "Error: buffer overflow");
        assert_eq!(err.0, "buffer overflow");
    }
}
