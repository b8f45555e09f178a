// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::fmt;

use crate::Id;
use crate::tracker::{EntityManager, Track, Tracker};

/// Forwards every event to each of a set of [`Tracker`]s.
///
/// Events are only passed on to the trackers that have the entity enabled, so
/// a quiet stdout tracker can sit alongside a verbose trace file.
pub struct MultiTracker {
    // Only used to hand out IDs shared by all trackers
    ids: EntityManager,
    trackers: Vec<Tracker>,
}

impl MultiTracker {
    /// Combine `trackers`, which must not be empty.
    #[must_use]
    pub fn new(trackers: Vec<Tracker>) -> Self {
        Self {
            ids: EntityManager::new(log::Level::Error),
            trackers,
        }
    }

    fn each_enabled(&self, id: Id, level: log::Level, f: impl Fn(&Tracker)) {
        self.trackers
            .iter()
            .filter(|t| t.is_entity_enabled(id, level))
            .for_each(f);
    }
}

impl Track for MultiTracker {
    fn unique_id(&self) -> Id {
        self.ids.unique_id()
    }

    fn is_entity_enabled(&self, id: Id, level: log::Level) -> bool {
        self.trackers.iter().any(|t| t.is_entity_enabled(id, level))
    }

    fn add_entity(&self, id: Id, entity_name: &str) {
        self.trackers.iter().for_each(|t| t.add_entity(id, entity_name));
    }

    fn enter(&self, id: Id, object: Id) {
        self.each_enabled(id, log::Level::Trace, |t| t.enter(id, object));
    }

    fn exit(&self, id: Id, object: Id) {
        self.each_enabled(id, log::Level::Trace, |t| t.exit(id, object));
    }

    fn value(&self, id: Id, value: f64) {
        self.each_enabled(id, log::Level::Trace, |t| t.value(id, value));
    }

    fn create(&self, created_by: Id, id: Id, num_bytes: usize, name: &str) {
        self.each_enabled(id, log::Level::Trace, |t| {
            t.create(created_by, id, num_bytes, name);
        });
    }

    fn destroy(&self, destroyed_by: Id, id: Id) {
        self.each_enabled(id, log::Level::Trace, |t| t.destroy(destroyed_by, id));
    }

    fn connect(&self, from: Id, to: Id) {
        self.each_enabled(from, log::Level::Trace, |t| t.connect(from, to));
    }

    fn log(&self, id: Id, level: log::Level, msg: fmt::Arguments) {
        self.each_enabled(id, level, |t| t.log(id, level, msg));
    }

    fn time(&self, set_by: Id, time_ns: f64) {
        self.trackers.iter().for_each(|t| t.time(set_by, time_ns));
    }

    fn shutdown(&self) {
        self.trackers.iter().for_each(|t| t.shutdown());
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::tracker::{DevNullTracker, InMemoryTracker};

    #[test]
    fn forwards_to_enabled_trackers() {
        let counting = Rc::new(InMemoryTracker::new(EntityManager::new(
            log::Level::Trace,
        )));
        let quiet: Tracker = Rc::new(DevNullTracker::default());
        let loud: Tracker = counting.clone();
        let multi = MultiTracker::new(vec![quiet, loud]);

        let buffer = multi.unique_id();
        multi.add_entity(buffer, "top::router_0_0::rx_north");
        assert!(multi.is_entity_enabled(buffer, log::Level::Trace));

        multi.enter(buffer, Id(100));
        multi.enter(buffer, Id(101));
        multi.exit(buffer, Id(100));
        assert_eq!(counting.num_entered(buffer), 2);
        assert_eq!(counting.num_exited(buffer), 1);
    }
}
