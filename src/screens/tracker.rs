//! Live Match Tracker - subscription lifecycle and the authoritative match map.
//!
//! # State Machine
//!
//! ```text
//!                 setup()
//!  UNINITIALIZED ─────────► TRACKING
//!        ▲                     │
//!        └──────── cleanup() ──┘
//! ```
//!
//! - `setup` is a no-op while TRACKING, while a setup is already running, or
//!   when the environment has no media support (degraded mode: the match map
//!   stays empty forever and nothing throws).
//! - Every subscription's change listener refreshes the WHOLE map from the
//!   live status of every subscription, so the map is consistent after any
//!   single event.
//! - `cleanup` is idempotent and infallible.
//!
//! Each refresh advances a version counter. Derived views cache against it,
//! and it is mirrored into a `Signal<u64>` so reactive effects that read the
//! engine re-run when matches change.

use std::cell::{Cell, OnceCell, RefCell};
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use spark_signals::{signal, Signal};
use tracing::{debug, trace, warn};

use super::query::build_media_query;
use crate::env::{ListenerId, MediaQueryList, SharedEnvironment};
use crate::error::Result;
use crate::types::NormalizedScreen;

/// Tracker lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackerState {
    #[default]
    Uninitialized,
    Tracking,
}

/// One live query handle per breakpoint.
struct Subscription {
    name: String,
    list: Rc<dyn MediaQueryList>,
    listener: ListenerId,
}

/// Owns the subscriptions and the name -> bool match map of one engine.
pub struct Tracker {
    screens: Vec<NormalizedScreen>,
    env: Option<SharedEnvironment>,
    /// Compiled query per screen, same order as `screens`.
    queries: Vec<OnceCell<String>>,
    subscriptions: RefCell<Vec<Subscription>>,
    matches: RefCell<IndexMap<String, bool>>,
    state: Cell<TrackerState>,
    setting_up: Cell<bool>,
    version: Cell<u64>,
    changed: Signal<u64>,
    weak_self: Weak<Tracker>,
}

impl Tracker {
    pub fn new(screens: Vec<NormalizedScreen>, env: Option<SharedEnvironment>) -> Rc<Self> {
        let queries = screens.iter().map(|_| OnceCell::new()).collect();
        Rc::new_cyclic(|weak_self| Self {
            screens,
            env,
            queries,
            subscriptions: RefCell::new(Vec::new()),
            matches: RefCell::new(IndexMap::new()),
            state: Cell::new(TrackerState::Uninitialized),
            setting_up: Cell::new(false),
            version: Cell::new(0),
            changed: signal(0),
            weak_self: weak_self.clone(),
        })
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Subscribe to every breakpoint and run the initial refresh.
    ///
    /// Registration failures propagate. Subscriptions made before the failure
    /// stay registered until `cleanup`.
    pub fn setup(&self) -> Result<()> {
        if self.state.get() == TrackerState::Tracking || self.setting_up.get() {
            return Ok(());
        }

        let Some(env) = self.env.as_ref().filter(|env| env.has_match_media()) else {
            debug!("media matching unavailable, screens stay empty");
            return Ok(());
        };

        self.setting_up.set(true);
        self.cleanup();
        let subscribed = self.subscribe_all(env);
        self.setting_up.set(false);
        subscribed?;

        self.state.set(TrackerState::Tracking);
        debug!(screens = self.screens.len(), "screens tracking");
        self.refresh();
        Ok(())
    }

    fn subscribe_all(&self, env: &SharedEnvironment) -> Result<()> {
        for (screen, query) in self.screens.iter().zip(&self.queries) {
            let query = query.get_or_init(|| build_media_query(&screen.values));
            let list = env.match_media(query).inspect_err(|err| {
                warn!(screen = %screen.name, query = %query, error = %err, "media subscription failed");
            })?;

            let tracker = self.weak_self.clone();
            let listener = list.add_listener(Rc::new(move |_: bool| {
                if let Some(tracker) = tracker.upgrade() {
                    tracker.refresh();
                }
            }));

            self.subscriptions.borrow_mut().push(Subscription {
                name: screen.name.clone(),
                list,
                listener,
            });
        }
        Ok(())
    }

    /// Recompute every entry from the live subscriptions.
    pub fn refresh(&self) {
        let fresh: IndexMap<String, bool> = self
            .subscriptions
            .borrow()
            .iter()
            .map(|sub| (sub.name.clone(), sub.list.matches()))
            .collect();
        trace!(matches = ?fresh, "screens refreshed");
        *self.matches.borrow_mut() = fresh;
        self.bump();
    }

    /// Unsubscribe everything and empty the match map. Never fails.
    pub fn cleanup(&self) {
        let subscriptions = std::mem::take(&mut *self.subscriptions.borrow_mut());
        for sub in &subscriptions {
            sub.list.remove_listener(sub.listener);
        }

        let had_matches = !self.matches.borrow().is_empty();
        self.matches.borrow_mut().clear();
        self.state.set(TrackerState::Uninitialized);

        if !subscriptions.is_empty() || had_matches {
            debug!(subscriptions = subscriptions.len(), "screens cleaned up");
            self.bump();
        }
    }

    fn bump(&self) {
        let next = self.version.get() + 1;
        self.version.set(next);
        self.changed.set(next);
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn state(&self) -> TrackerState {
        self.state.get()
    }

    /// False when the environment is missing or has no media support.
    pub fn is_supported(&self) -> bool {
        crate::env::supports_match_media(self.env.as_ref())
    }

    pub fn screens(&self) -> &[NormalizedScreen] {
        &self.screens
    }

    /// Compiled query of a breakpoint, once it has been subscribed.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.screens
            .iter()
            .position(|s| s.name == name)
            .and_then(|i| self.queries[i].get())
            .map(String::as_str)
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.borrow().len()
    }

    /// Version of the match map. Advances on every refresh and write.
    pub fn version(&self) -> u64 {
        self.version.get()
    }

    /// Register a reactive dependency on the match map.
    pub fn track(&self) {
        let _ = self.changed.get();
    }

    /// Live value of one entry.
    pub fn get(&self, name: &str) -> Option<bool> {
        self.track();
        self.matches.borrow().get(name).copied()
    }

    /// Copy of the current map, in declaration order.
    pub fn snapshot(&self) -> IndexMap<String, bool> {
        self.track();
        self.matches.borrow().clone()
    }

    /// Names of the entries currently `true`, in declaration order.
    pub fn active_names(&self) -> Vec<String> {
        self.matches
            .borrow()
            .iter()
            .filter(|(_, matches)| **matches)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Write one entry directly. Overwritten by the next refresh.
    ///
    /// Ignored without media support, where nothing ever matches.
    pub fn write(&self, name: &str, value: bool) {
        if !self.is_supported() {
            trace!(screen = name, "write ignored, media matching unavailable");
            return;
        }
        self.matches.borrow_mut().insert(name.to_string(), value);
        self.bump();
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        for sub in self.subscriptions.get_mut().drain(..) {
            sub.list.remove_listener(sub.listener);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
