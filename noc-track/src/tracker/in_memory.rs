// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::Id;
use crate::tracker::{EntityManager, Track};

#[derive(Default)]
struct EntityCounts {
    entered: usize,
    exited: usize,
    last_value: Option<f64>,
}

/// A tracker that keeps per-entity event counts in memory.
///
/// Nothing is written out. Tests use it to check how many objects passed
/// through an entity without parsing a text trace.
pub struct InMemoryTracker {
    entity_manager: EntityManager,
    names: RefCell<HashMap<Id, String>>,
    counts: RefCell<HashMap<Id, EntityCounts>>,
    num_logs: RefCell<HashMap<log::Level, usize>>,
}

impl InMemoryTracker {
    /// Create a new [`InMemoryTracker`] with an [`EntityManager`].
    #[must_use]
    pub fn new(entity_manager: EntityManager) -> Self {
        Self {
            entity_manager,
            names: RefCell::new(HashMap::new()),
            counts: RefCell::new(HashMap::new()),
            num_logs: RefCell::new(HashMap::new()),
        }
    }

    /// Number of objects that have entered the entity with the given ID.
    #[must_use]
    pub fn num_entered(&self, id: Id) -> usize {
        self.counts.borrow().get(&id).map_or(0, |c| c.entered)
    }

    /// Number of objects that have exited the entity with the given ID.
    #[must_use]
    pub fn num_exited(&self, id: Id) -> usize {
        self.counts.borrow().get(&id).map_or(0, |c| c.exited)
    }

    /// The last value recorded against the entity with the given ID.
    #[must_use]
    pub fn last_value(&self, id: Id) -> Option<f64> {
        self.counts.borrow().get(&id).and_then(|c| c.last_value)
    }

    /// Number of log messages emitted at the given level.
    #[must_use]
    pub fn num_logs(&self, level: log::Level) -> usize {
        self.num_logs.borrow().get(&level).copied().unwrap_or(0)
    }

    /// Look up the ID of an entity from its full hierarchical name.
    #[must_use]
    pub fn id_of(&self, full_name: &str) -> Option<Id> {
        self.names
            .borrow()
            .iter()
            .find(|(_, name)| name.as_str() == full_name)
            .map(|(id, _)| *id)
    }
}

impl Track for InMemoryTracker {
    fn unique_id(&self) -> Id {
        self.entity_manager.unique_id()
    }

    fn is_entity_enabled(&self, id: Id, level: log::Level) -> bool {
        self.entity_manager.is_log_enabled_at_level(id, level)
    }

    fn add_entity(&self, id: Id, entity_name: &str) {
        self.entity_manager.add_entity(id, entity_name);
        self.names.borrow_mut().insert(id, entity_name.to_string());
    }

    fn enter(&self, id: Id, _object: Id) {
        self.counts.borrow_mut().entry(id).or_default().entered += 1;
    }

    fn exit(&self, id: Id, _object: Id) {
        self.counts.borrow_mut().entry(id).or_default().exited += 1;
    }

    fn value(&self, id: Id, value: f64) {
        self.counts.borrow_mut().entry(id).or_default().last_value = Some(value);
    }

    fn create(&self, _created_by: Id, _id: Id, _num_bytes: usize, _name: &str) {}

    fn destroy(&self, _destroyed_by: Id, _id: Id) {}

    fn connect(&self, _connect_from: Id, _connect_to: Id) {}

    fn log(&self, _id: Id, level: log::Level, _msg: std::fmt::Arguments) {
        *self.num_logs.borrow_mut().entry(level).or_default() += 1;
    }

    fn time(&self, _set_by: Id, _time_ns: f64) {}

    fn shutdown(&self) {}
}
