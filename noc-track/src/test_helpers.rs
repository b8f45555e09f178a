// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! This module provides helper functions for testing logging output
//!
//! The aim of this module is to provide commonly-used functions that enable the
//! testing of the output that should appear from tracking macros, and to give
//! every test its own trace file.

use std::cell::{Cell, RefCell};
use std::fs;
use std::io::BufWriter;
use std::path::Path;
use std::rc::Rc;

use regex::Regex;

use crate::tracker::{EntityManager, TextTracker, dev_null_tracker};
use crate::{Id, Track, Tracker, Writer, str_to_level};

/// Environment variable that sets the level of the per-test trace files.
pub const TEST_LOG_LEVEL_ENV: &str = "NOC_TEST_LOG_LEVEL";

/// A tracker that keeps track events.
pub struct TestTracker {
    events: RefCell<Vec<String>>,
    unique_id: Cell<u64>,
}

impl TestTracker {
    /// Create a new [`Tracker`](crate::Tracker) for the tests.
    ///
    /// This keeps the track events in memory for checking later.
    #[must_use]
    pub fn new(initial_id: u64) -> Self {
        Self {
            events: RefCell::new(Vec::new()),
            unique_id: Cell::new(initial_id),
        }
    }

    fn add_event(&self, event: String) {
        println!("{event}");
        self.events.borrow_mut().push(event);
    }
}

impl Track for TestTracker {
    fn unique_id(&self) -> Id {
        let id = self.unique_id.get();
        self.unique_id.set(id + 1);
        Id(id)
    }

    fn is_entity_enabled(&self, _id: Id, _level: log::Level) -> bool {
        true
    }

    fn add_entity(&self, _id: Id, _entity_name: &str) {
        // Do nothing
    }

    fn enter(&self, id: Id, item: Id) {
        self.add_event(format!("{id}: {item} entered"));
    }

    fn exit(&self, id: Id, item: Id) {
        self.add_event(format!("{id}: {item} exited"));
    }

    fn value(&self, id: Id, value: f64) {
        self.add_event(format!("{id}: value {value}"));
    }

    fn create(&self, created_by: Id, id: Id, num_bytes: usize, name: &str) {
        self.add_event(format!("{created_by}: created {id}, {name}, {num_bytes} bytes"));
    }

    fn destroy(&self, destroyed_by: Id, id: Id) {
        self.add_event(format!("{destroyed_by}: destroyed {id}"));
    }

    fn connect(&self, connect_from: Id, connect_to: Id) {
        self.add_event(format!("{connect_from}: connect to {connect_to}"));
    }

    fn log(&self, id: Id, level: log::Level, msg: std::fmt::Arguments) {
        self.add_event(format!("{id}:{level}: {msg}"));
    }

    fn time(&self, set_by: Id, time_ns: f64) {
        self.add_event(format!("{set_by}: set time {time_ns:.1}ns"));
    }

    fn shutdown(&self) {
        // Do nothing
    }
}

/// Initialise a [`TestTracker`] for a test
///
/// Returns both the concrete [`TestTracker`] (for checking events) and the
/// same object as a [`Tracker`](crate::Tracker) to build entities from.
///
/// # Arguments
///
/// * `start_id` - The ID value to be set as the starting value
///
/// # Examples
///
/// ```
/// use noc_track::test_helpers;
///
/// let (test_tracker, tracker) = noc_track::test_init!(10);
/// let top = noc_track::entity::toplevel(&tracker, "top");
/// test_helpers::check_and_clear(&test_tracker, &["0: created 10, top, 0 bytes"]);
/// ```
#[macro_export]
macro_rules! test_init {
    ($start_id:expr) => {{
        let test_tracker = std::rc::Rc::new($crate::test_helpers::TestTracker::new($start_id));
        let tracker: $crate::Tracker = test_tracker.clone();
        (test_tracker, tracker)
    }};
}

/// Check and clear the _trace_ and _log_ output
///
/// This function asserts that the events seen since the start or the last
/// time this function was called match the expected regular expressions, in
/// order. It then clears the recorded events.
///
/// # Arguments
///
/// * `tracker`  - The [`TestTracker`] being used in the test.
/// * `expected` - An array of expected regular expressions that the events
///   will be matched against.
pub fn check_and_clear(tracker: &TestTracker, expected: &[&str]) {
    let mut events = tracker.events.borrow_mut();

    println!("Checking {:?} matches {:?}", expected, *events);

    // Check that there are the same number of strings produced as expected
    assert_eq!(expected.len(), events.len());

    for (i, (log_expect, actual)) in expected.iter().zip(events.iter()).enumerate() {
        let re = Regex::new(log_expect).unwrap();
        println!("Checking {i}: {log_expect:?} matches {actual:?}");
        assert!(re.is_match(actual));
    }

    events.clear();
}

/// Create a [`Tracker`] that writes a text trace for the test in `full_filepath`.
///
/// All trace files are placed in a `traces` folder and named after the test
/// file. The level defaults to `Warn` and can be raised with the
/// `NOC_TEST_LOG_LEVEL` environment variable. If the trace file cannot be
/// created the test runs with a tracker that discards all events.
#[must_use]
pub fn create_tracker(full_filepath: &str) -> Tracker {
    // Place all trace files in one folder
    const FOLDER: &str = "traces";

    let level = std::env::var(TEST_LOG_LEVEL_ENV)
        .map(|lvl| str_to_level(&lvl))
        .unwrap_or(log::Level::Warn);

    let filename_only = Path::new(full_filepath)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("test");

    let file = fs::create_dir_all(FOLDER)
        .and_then(|()| fs::File::create(format!("{FOLDER}/{filename_only}.log")));
    match file {
        Ok(file) => {
            let writer: Writer = Box::new(BufWriter::new(file));
            Rc::new(TextTracker::new(EntityManager::new(level), writer))
        }
        Err(_) => dev_null_tracker(),
    }
}
