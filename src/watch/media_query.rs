//! Single media query watcher.
//!
//! The same subscribe/notify pattern as the screens engine, for one ad hoc
//! query string.
//!
//! ```ignore
//! let handle = use_media_query(Some(&env), "(orientation: portrait)", |portrait| {
//!     println!("portrait: {portrait}");
//! })?;
//! // ...
//! handle.stop();
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::env::{supports_match_media, ListenerId, MediaQueryList, SharedEnvironment};
use crate::error::Result;

/// Subscription handle returned by [`use_media_query`]. Stops on drop.
pub struct MediaQueryHandle {
    supported: bool,
    subscription: RefCell<Option<(Rc<dyn MediaQueryList>, ListenerId)>>,
}

impl MediaQueryHandle {
    /// Whether the environment could evaluate media queries at all.
    pub fn is_supported(&self) -> bool {
        self.supported
    }

    /// Whether the subscription is still live.
    pub fn is_active(&self) -> bool {
        self.subscription.borrow().is_some()
    }

    /// Current evaluation, `None` once stopped or when unsupported.
    pub fn matches(&self) -> Option<bool> {
        self.subscription.borrow().as_ref().map(|(list, _)| list.matches())
    }

    /// Unsubscribe. Safe to call repeatedly.
    pub fn stop(&self) {
        let taken = self.subscription.borrow_mut().take();
        if let Some((list, id)) = taken {
            debug!(query = %list.media(), "media query watcher stopped");
            list.remove_listener(id);
        }
    }
}

impl Drop for MediaQueryHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Watch one media query.
///
/// When supported and `query` is non-empty, `callback` runs immediately with
/// the current evaluation and again on every change.
pub fn use_media_query(
    env: Option<&SharedEnvironment>,
    query: &str,
    callback: impl Fn(bool) + 'static,
) -> Result<MediaQueryHandle> {
    let supported = supports_match_media(env);
    let handle = MediaQueryHandle { supported, subscription: RefCell::new(None) };

    let Some(env) = env.filter(|_| supported && !query.is_empty()) else {
        return Ok(handle);
    };

    let list = env.match_media(query)?;
    let callback = Rc::new(callback);
    let listener = callback.clone();
    let id = list.add_listener(Rc::new(move |matches| listener(matches)));
    let initial = list.matches();
    *handle.subscription.borrow_mut() = Some((list, id));

    callback(initial);
    Ok(handle)
}

// =============================================================================
// Tests
// =============================================================================
