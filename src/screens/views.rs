//! Derived View Layer - lazy views over the match map.
//!
//! Each view is a `spark_signals::Derived` hanging off the tracker's change
//! signal: it computes on first read, caches, and recomputes only after the
//! match map changed. `current` is derived from `list`, so a refresh that
//! leaves the active list unchanged does not recompute it. Reading a view
//! inside an `effect` registers a dependency on the match map.
//!
//! - `list` - names currently matching, in declaration order
//! - `current` - the LAST matching name (most recently declared wins)
//! - `resolve` - the configured value of the last matching configured name

use std::cell::Cell;
use std::rc::Rc;

use spark_signals::{derived, Derived};

use super::tracker::Tracker;
use crate::types::{Resolved, ScreensConfig};

// =============================================================================
// VIEWS
// =============================================================================

/// The derived views of one engine.
pub struct Views {
    list: Derived<Vec<String>>,
    current: Derived<Option<String>>,
    list_runs: Rc<Cell<usize>>,
    current_runs: Rc<Cell<usize>>,
}

impl Views {
    pub fn new(tracker: Rc<Tracker>) -> Self {
        let list_runs = Rc::new(Cell::new(0));
        let current_runs = Rc::new(Cell::new(0));

        let runs = list_runs.clone();
        let list = derived(move || {
            runs.set(runs.get() + 1);
            // Read the change signal (creates reactive dependency)
            tracker.track();
            tracker.active_names()
        });

        let runs = current_runs.clone();
        let names = list.clone();
        let current = derived(move || {
            runs.set(runs.get() + 1);
            names.get().last().cloned()
        });

        Self { list, current, list_runs, current_runs }
    }

    /// Names of matching breakpoints, in declaration order.
    pub fn list(&self) -> Vec<String> {
        self.list.get()
    }

    /// The last-declared matching breakpoint.
    pub fn current(&self) -> Option<String> {
        self.current.get()
    }

    /// `list` with each name replaced by its configured value when present.
    pub fn list_with<T: Clone>(&self, config: &ScreensConfig<T>) -> Vec<Resolved<T>> {
        map_names(config, self.list())
    }

    /// Configured values of the matching breakpoints that have one.
    pub fn map_list<T: Clone>(&self, config: &ScreensConfig<T>) -> Vec<T> {
        configured_values(config, &self.list())
    }

    /// `current` mapped through `config`.
    ///
    /// When nothing matches: `default`, else the config's own default, else `None`.
    pub fn current_with<T: Clone>(
        &self,
        config: &ScreensConfig<T>,
        default: Option<T>,
    ) -> Option<Resolved<T>> {
        map_current(config, self.current(), default)
    }

    /// Value of the last-declared matching breakpoint present in `config`.
    ///
    /// Falls back like [`Views::current_with`].
    pub fn resolve<T: Clone>(&self, config: &ScreensConfig<T>, default: Option<T>) -> Option<T> {
        resolve_names(config, &self.list(), default)
    }

    /// Recompute counts of the (list, current) views.
    pub fn computations(&self) -> (usize, usize) {
        (self.list_runs.get(), self.current_runs.get())
    }
}

// =============================================================================
// MAPPING
// =============================================================================

fn map_name<T: Clone>(config: &ScreensConfig<T>, name: String) -> Resolved<T> {
    match config.get(&name) {
        Some(value) => Resolved::Value(value.clone()),
        None => Resolved::Name(name),
    }
}

fn fallback<T: Clone>(config: &ScreensConfig<T>, default: Option<T>) -> Option<T> {
    default.or_else(|| config.default_value().cloned())
}

pub(crate) fn map_names<T: Clone>(config: &ScreensConfig<T>, names: Vec<String>) -> Vec<Resolved<T>> {
    names.into_iter().map(|name| map_name(config, name)).collect()
}

pub(crate) fn configured_values<T: Clone>(config: &ScreensConfig<T>, names: &[String]) -> Vec<T> {
    names.iter().filter_map(|name| config.get(name).cloned()).collect()
}

pub(crate) fn map_current<T: Clone>(
    config: &ScreensConfig<T>,
    current: Option<String>,
    default: Option<T>,
) -> Option<Resolved<T>> {
    match current {
        Some(name) => Some(map_name(config, name)),
        None => fallback(config, default).map(Resolved::Value),
    }
}

pub(crate) fn resolve_names<T: Clone>(
    config: &ScreensConfig<T>,
    names: &[String],
    default: Option<T>,
) -> Option<T> {
    names
        .iter()
        .rev()
        .find_map(|name| config.get(name).cloned())
        .or_else(|| fallback(config, default))
}

// =============================================================================
// Tests
// =============================================================================
