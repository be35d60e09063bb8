//! Media Environment - the host boundary the screens engine subscribes to.
//!
//! The engine never evaluates media queries itself. It asks the host to turn
//! a query string into a live [`MediaQueryList`] and listens for changes.
//!
//! # Hosts
//!
//! - [`Headless`] - no media support; engines run in degraded mode
//! - [`Viewport`] - in-process viewport state with change notifications
//! - [`TerminalViewport`] - a `Viewport` sized from the terminal (crossterm)

pub mod media;
pub mod terminal;
pub mod viewport;

use std::rc::Rc;

use crate::error::Result;

pub use media::{ColorScheme, MediaFeatures, MediaQuery, MediaTypes};
pub use terminal::{TerminalConfig, TerminalViewport};
pub use viewport::Viewport;

// =============================================================================
// TYPES
// =============================================================================

/// Change listener. Receives the list's new evaluation.
pub type MediaListener = Rc<dyn Fn(bool)>;

/// Handle returned by [`MediaQueryList::add_listener`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// A live media-query handle.
///
/// `matches` always reflects the environment's current state. Listeners
/// fire only when the evaluation flips.
pub trait MediaQueryList {
    /// The query text this handle evaluates.
    fn media(&self) -> String;

    /// Current evaluation.
    fn matches(&self) -> bool;

    /// Register a change listener.
    fn add_listener(&self, listener: MediaListener) -> ListenerId;

    /// Remove a listener. Unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);
}

/// A host that can compile media queries into live handles.
pub trait MediaEnvironment {
    /// Capability probe. Engines must check this before calling `match_media`.
    fn has_match_media(&self) -> bool;

    /// Compile a query into a live handle.
    fn match_media(&self, query: &str) -> Result<Rc<dyn MediaQueryList>>;
}

/// Shared environment handle as held by engines and watchers.
pub type SharedEnvironment = Rc<dyn MediaEnvironment>;

/// True when `env` is present and supports media matching.
pub fn supports_match_media(env: Option<&SharedEnvironment>) -> bool {
    env.is_some_and(|env| env.has_match_media())
}

// =============================================================================
// HEADLESS
// =============================================================================

/// An environment without media support (tests, pipes, non-interactive runs).
#[derive(Clone, Copy, Debug, Default)]
pub struct Headless;

impl MediaEnvironment for Headless {
    fn has_match_media(&self) -> bool {
        false
    }

    fn match_media(&self, query: &str) -> Result<Rc<dyn MediaQueryList>> {
        Err(crate::error::ScreensError::Environment(format!(
            "headless environment cannot match `{query}`"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_probe() {
        let env: SharedEnvironment = Rc::new(Headless);
        assert!(!supports_match_media(Some(&env)));
        assert!(!supports_match_media(None));
        assert!(env.match_media("(min-width: 1px)").is_err());
    }

    #[test]
    fn test_viewport_probe() {
        let env: SharedEnvironment = Rc::new(Viewport::new(800, 600));
        assert!(supports_match_media(Some(&env)));
    }
}
