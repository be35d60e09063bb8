//! Accessor Merge Layer - the one object callers hold.
//!
//! Combines the dynamic per-breakpoint booleans with the fixed operations
//! (`list`, `current`/`resolve`, `cleanup`). Breakpoint reads always go to the
//! live match map; nothing is copied at construction.
//!
//! # Key lookup
//!
//! ```text
//! screens.get("list")    -> ScreenEntry::Operation(ScreenOp::List)   // fixed keys win
//! screens.get("md")      -> ScreenEntry::Match(Some(true))           // live entry
//! screens.get("nope")    -> ScreenEntry::Match(None)
//! ```
//!
//! Writes to fixed keys install an override in this layer and never touch
//! the match map. Writes to any other key pass through to the match map.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::debug;

use super::normalize::normalize_screens;
use super::tracker::{Tracker, TrackerState};
use super::views::{configured_values, map_current, map_names, resolve_names, Views};
use crate::env::SharedEnvironment;
use crate::error::{Result, ScreensError};
use crate::types::{NormalizedScreen, Resolved, ScreensConfig, ScreensInput};

// =============================================================================
// KEYS
// =============================================================================

/// The fixed operations of the accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenOp {
    List,
    /// Also reachable as `resolve`. An override shadows both.
    Current,
    Cleanup,
}

impl ScreenOp {
    /// Keys that always resolve to an operation.
    pub const KEYS: [&'static str; 4] = ["list", "current", "resolve", "cleanup"];

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "list" => Some(Self::List),
            "current" | "resolve" => Some(Self::Current),
            "cleanup" => Some(Self::Cleanup),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Current => "current",
            Self::Cleanup => "cleanup",
        }
    }
}

/// Result of reading one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenEntry {
    Operation(ScreenOp),
    Match(Option<bool>),
}

pub type ListFn = Rc<dyn Fn() -> Vec<String>>;
pub type CurrentFn = Rc<dyn Fn() -> Option<String>>;
pub type CleanupFn = Rc<dyn Fn()>;

/// A replacement for one fixed operation.
#[derive(Clone)]
pub enum OpOverride {
    List(ListFn),
    Current(CurrentFn),
    Cleanup(CleanupFn),
}

impl OpOverride {
    pub fn op(&self) -> ScreenOp {
        match self {
            Self::List(_) => ScreenOp::List,
            Self::Current(_) => ScreenOp::Current,
            Self::Cleanup(_) => ScreenOp::Cleanup,
        }
    }
}

impl fmt::Debug for OpOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpOverride({:?})", self.op())
    }
}

/// A value written through [`Screens::set`].
#[derive(Debug, Clone)]
pub enum ScreenWrite {
    Override(OpOverride),
    Match(bool),
}

#[derive(Default)]
struct Overrides {
    list: Option<ListFn>,
    current: Option<CurrentFn>,
    cleanup: Option<CleanupFn>,
}

// =============================================================================
// SCREENS
// =============================================================================

struct ScreensInner {
    tracker: Rc<Tracker>,
    views: Views,
    overrides: RefCell<Overrides>,
}

/// A screens engine: named breakpoints with live match tracking.
///
/// Cheap to clone; clones share the same engine. Every call to
/// [`Screens::new`] builds an independent engine.
///
/// # Example
/// ```ignore
/// let viewport = Viewport::new(800, 600);
/// let screens = Screens::new(None, Some(Rc::new(viewport.clone())))?;
///
/// assert_eq!(screens.matches("md"), Some(true));
/// assert_eq!(screens.current().as_deref(), Some("md"));
///
/// viewport.resize(1280, 800);
/// assert_eq!(screens.current().as_deref(), Some("xl"));
/// ```
#[derive(Clone)]
pub struct Screens {
    inner: Rc<ScreensInner>,
}

impl Screens {
    /// Build an engine and start tracking.
    ///
    /// `None` input uses [`DEFAULT_SCREENS`](crate::types::DEFAULT_SCREENS).
    /// Configuration errors and subscription failures propagate. A missing
    /// or unsupported environment is not an error: nothing ever matches.
    pub fn new(input: Option<ScreensInput>, env: Option<SharedEnvironment>) -> Result<Self> {
        let input = input.unwrap_or_default();
        let screens = normalize_screens(&input)?;
        Self::from_normalized(screens, env)
    }

    /// Build an engine from already normalized screens.
    pub fn from_normalized(
        screens: Vec<NormalizedScreen>,
        env: Option<SharedEnvironment>,
    ) -> Result<Self> {
        debug!(screens = screens.len(), "creating screens engine");
        let tracker = Tracker::new(screens, env);
        let engine = Self {
            inner: Rc::new(ScreensInner {
                views: Views::new(tracker.clone()),
                tracker,
                overrides: RefCell::new(Overrides::default()),
            }),
        };
        engine.setup()?;
        Ok(engine)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Start tracking. No-op while already tracking.
    pub fn setup(&self) -> Result<()> {
        self.inner.tracker.setup()
    }

    /// Stop tracking and empty the match map. Safe to call repeatedly.
    pub fn cleanup(&self) {
        let hook = self.inner.overrides.borrow().cleanup.clone();
        match hook {
            Some(hook) => hook(),
            None => self.inner.tracker.cleanup(),
        }
    }

    pub fn state(&self) -> TrackerState {
        self.inner.tracker.state()
    }

    /// False when running without media support (degraded mode).
    pub fn is_supported(&self) -> bool {
        self.inner.tracker.is_supported()
    }

    // =========================================================================
    // Match map
    // =========================================================================

    /// Live match state of one breakpoint. `None` for unknown names.
    pub fn matches(&self, name: &str) -> Option<bool> {
        self.inner.tracker.get(name)
    }

    /// Copy of the live match map, in declaration order.
    pub fn matches_map(&self) -> IndexMap<String, bool> {
        self.inner.tracker.snapshot()
    }

    /// The normalized breakpoint definitions.
    pub fn screens(&self) -> &[NormalizedScreen] {
        self.inner.tracker.screens()
    }

    /// The compiled media query of a breakpoint.
    pub fn query(&self, name: &str) -> Option<String> {
        self.inner.tracker.query(name).map(str::to_string)
    }

    /// Version of the match map; advances on every change.
    pub fn version(&self) -> u64 {
        self.inner.tracker.version()
    }

    /// True when both handles point at the same engine.
    pub fn same_engine(&self, other: &Screens) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // =========================================================================
    // Derived views
    // =========================================================================

    /// Names of matching breakpoints, in declaration order.
    pub fn list(&self) -> Vec<String> {
        let hook = self.inner.overrides.borrow().list.clone();
        match hook {
            Some(hook) => hook(),
            None => self.inner.views.list(),
        }
    }

    /// The last-declared matching breakpoint.
    pub fn current(&self) -> Option<String> {
        let hook = self.inner.overrides.borrow().current.clone();
        match hook {
            Some(hook) => hook(),
            None => self.inner.views.current(),
        }
    }

    /// `list` with names replaced by configured values where present.
    pub fn list_with<T: Clone>(&self, config: &ScreensConfig<T>) -> Vec<Resolved<T>> {
        map_names(config, self.list())
    }

    /// Configured values of matching breakpoints, skipping unconfigured ones.
    pub fn map_list<T: Clone>(&self, config: &ScreensConfig<T>) -> Vec<T> {
        configured_values(config, &self.list())
    }

    /// `current` mapped through `config`, with `default` then `config`'s default
    /// as fallbacks when nothing matches.
    pub fn current_with<T: Clone>(
        &self,
        config: &ScreensConfig<T>,
        default: Option<T>,
    ) -> Option<Resolved<T>> {
        map_current(config, self.current(), default)
    }

    /// Value for the last-declared matching breakpoint that `config` knows.
    ///
    /// With a `current`/`resolve` override installed, the overridden name is
    /// resolved instead.
    ///
    /// ```ignore
    /// let cols = screens.resolve(&ScreensConfig::new().with("sm", 1).with("lg", 3), Some(0));
    /// ```
    pub fn resolve<T: Clone>(&self, config: &ScreensConfig<T>, default: Option<T>) -> Option<T> {
        let hook = self.inner.overrides.borrow().current.clone();
        match hook {
            Some(hook) => resolve_names(config, hook().as_slice(), default),
            None => resolve_names(config, &self.list(), default),
        }
    }

    /// Recompute counts of the built-in (list, current) views.
    pub fn view_computations(&self) -> (usize, usize) {
        self.inner.views.computations()
    }

    // =========================================================================
    // Keyed access
    // =========================================================================

    /// Read one key. Fixed keys take priority over breakpoint names.
    pub fn get(&self, key: &str) -> ScreenEntry {
        match ScreenOp::from_key(key) {
            Some(op) => ScreenEntry::Operation(op),
            None => ScreenEntry::Match(self.matches(key)),
        }
    }

    /// Write one key.
    ///
    /// Fixed keys accept [`ScreenWrite::Override`] for that operation; other
    /// keys accept [`ScreenWrite::Match`], written straight to the match map.
    pub fn set(&self, key: &str, value: ScreenWrite) -> Result<()> {
        match (ScreenOp::from_key(key), value) {
            (Some(op), ScreenWrite::Override(hook)) if hook.op() == op => {
                self.override_op(hook);
                Ok(())
            }
            (None, ScreenWrite::Match(matches)) => {
                self.inner.tracker.write(key, matches);
                Ok(())
            }
            _ => Err(ScreensError::InvalidWrite { key: key.to_string() }),
        }
    }

    /// Write one breakpoint's match state. Replaced by the next refresh.
    pub fn set_match(&self, name: &str, matches: bool) -> Result<()> {
        self.set(name, ScreenWrite::Match(matches))
    }

    /// Shadow a fixed operation from now on.
    pub fn override_op(&self, hook: OpOverride) {
        debug!(op = ?hook.op(), "screens operation overridden");
        let mut overrides = self.inner.overrides.borrow_mut();
        match hook {
            OpOverride::List(f) => overrides.list = Some(f),
            OpOverride::Current(f) => overrides.current = Some(f),
            OpOverride::Cleanup(f) => overrides.cleanup = Some(f),
        }
    }

    /// Restore the built-in behavior of an operation.
    pub fn clear_override(&self, op: ScreenOp) {
        let mut overrides = self.inner.overrides.borrow_mut();
        match op {
            ScreenOp::List => overrides.list = None,
            ScreenOp::Current => overrides.current = None,
            ScreenOp::Cleanup => overrides.cleanup = None,
        }
    }
}

impl fmt::Debug for Screens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Screens")
            .field("state", &self.state())
            .field("matches", &self.inner.tracker.snapshot())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
