//! Viewport - an in-process media environment.
//!
//! Holds the current [`MediaFeatures`] and every live query list created from
//! it. State changes (`resize`, `set_media_type`, `set_color_scheme`) notify
//! each list whose evaluation flipped, the way a browser fires `change` on a
//! `MediaQueryList`. Notification happens after all internal borrows are
//! released, so listeners may read any list or update the viewport again.
//!
//! ```ignore
//! let viewport = Viewport::new(800, 600);
//! let list = viewport.match_media("(min-width: 1024px)")?;
//! list.add_listener(Rc::new(|matches| println!("lg: {matches}")));
//! viewport.resize(1280, 720); // prints "lg: true"
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::trace;

use super::media::{ColorScheme, MediaFeatures, MediaQuery, MediaTypes};
use super::{ListenerId, MediaEnvironment, MediaListener, MediaQueryList};
use crate::error::Result;

// =============================================================================
// VIEWPORT
// =============================================================================

struct ViewportInner {
    features: RefCell<MediaFeatures>,
    lists: RefCell<Vec<Weak<ViewportList>>>,
}

/// Shared viewport state. Cloning gives another handle to the same viewport.
#[derive(Clone)]
pub struct Viewport {
    inner: Rc<ViewportInner>,
}

impl Viewport {
    /// Create a screen viewport of the given size in px.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_features(MediaFeatures::new(width as f32, height as f32))
    }

    pub fn with_features(features: MediaFeatures) -> Self {
        Self {
            inner: Rc::new(ViewportInner {
                features: RefCell::new(features),
                lists: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Snapshot of the current features.
    pub fn features(&self) -> MediaFeatures {
        *self.inner.features.borrow()
    }

    pub fn width(&self) -> f32 {
        self.inner.features.borrow().width
    }

    pub fn height(&self) -> f32 {
        self.inner.features.borrow().height
    }

    /// Resize the viewport (px) and notify flipped queries.
    pub fn resize(&self, width: u32, height: u32) {
        self.update(|f| {
            f.width = width as f32;
            f.height = height as f32;
        });
    }

    pub fn set_media_type(&self, media_type: MediaTypes) {
        self.update(|f| f.media_type = media_type);
    }

    pub fn set_color_scheme(&self, scheme: ColorScheme) {
        self.update(|f| f.color_scheme = scheme);
    }

    /// Apply an arbitrary feature change and notify flipped queries.
    pub fn update(&self, change: impl FnOnce(&mut MediaFeatures)) {
        change(&mut self.inner.features.borrow_mut());
        self.notify();
    }

    /// Number of query lists still alive.
    pub fn live_queries(&self) -> usize {
        self.inner
            .lists
            .borrow()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    fn notify(&self) {
        let lists: Vec<Rc<ViewportList>> = {
            let mut lists = self.inner.lists.borrow_mut();
            lists.retain(|w| w.strong_count() > 0);
            lists.iter().filter_map(Weak::upgrade).collect()
        };

        for list in lists {
            let now = list.matches();
            if now == list.last.get() {
                continue;
            }
            list.last.set(now);
            trace!(query = %list.query.text(), matches = now, "media query changed");

            let listeners: Vec<MediaListener> = list
                .listeners
                .borrow()
                .iter()
                .map(|(_, l)| l.clone())
                .collect();
            for listener in listeners {
                listener(now);
            }
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl MediaEnvironment for Viewport {
    fn has_match_media(&self) -> bool {
        true
    }

    fn match_media(&self, query: &str) -> Result<Rc<dyn MediaQueryList>> {
        let query = MediaQuery::parse(query);
        let initial = query.matches(&self.inner.features.borrow());
        let list = Rc::new(ViewportList {
            viewport: Rc::downgrade(&self.inner),
            query,
            last: Cell::new(initial),
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        });
        self.inner.lists.borrow_mut().push(Rc::downgrade(&list));
        Ok(list)
    }
}

// =============================================================================
// QUERY LIST
// =============================================================================

struct ViewportList {
    viewport: Weak<ViewportInner>,
    query: MediaQuery,
    /// Evaluation at the last notification.
    last: Cell<bool>,
    listeners: RefCell<Vec<(ListenerId, MediaListener)>>,
    next_id: Cell<u64>,
}

impl MediaQueryList for ViewportList {
    fn media(&self) -> String {
        self.query.text().to_string()
    }

    fn matches(&self) -> bool {
        match self.viewport.upgrade() {
            Some(inner) => self.query.matches(&inner.features.borrow()),
            None => self.last.get(),
        }
    }

    fn add_listener(&self, listener: MediaListener) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_media_initial() {
        let viewport = Viewport::new(800, 600);
        let md = viewport.match_media("(min-width: 768px)").unwrap();
        let lg = viewport.match_media("(min-width: 1024px)").unwrap();
        assert!(md.matches());
        assert!(!lg.matches());
        assert_eq!(lg.media(), "(min-width: 1024px)");
    }

    #[test]
    fn test_listener_fires_only_on_flip() {
        let viewport = Viewport::new(800, 600);
        let lg = viewport.match_media("(min-width: 1024px)").unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        lg.add_listener(Rc::new(move |m| sink.borrow_mut().push(m)));

        viewport.resize(900, 600);
        viewport.resize(1100, 600);
        viewport.resize(1200, 600);
        viewport.resize(500, 600);

        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn test_remove_listener() {
        let viewport = Viewport::new(100, 100);
        let list = viewport.match_media("(min-width: 200px)").unwrap();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let id = list.add_listener(Rc::new(move |_| c.set(c.get() + 1)));

        viewport.resize(300, 100);
        list.remove_listener(id);
        viewport.resize(100, 100);
        list.remove_listener(id);

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_listener_can_read_other_lists() {
        let viewport = Viewport::new(100, 100);
        let a = viewport.match_media("(min-width: 200px)").unwrap();
        let b = viewport.match_media("(max-width: 150px)").unwrap();

        let seen = Rc::new(Cell::new(None));
        let sink = seen.clone();
        let b_reader = b.clone();
        a.add_listener(Rc::new(move |_| sink.set(Some(b_reader.matches()))));

        viewport.resize(250, 100);
        assert_eq!(seen.get(), Some(false));
    }

    #[test]
    fn test_dropped_lists_are_pruned() {
        let viewport = Viewport::new(100, 100);
        let keep = viewport.match_media("print").unwrap();
        drop(viewport.match_media("screen").unwrap());
        assert_eq!(viewport.live_queries(), 1);
        viewport.set_media_type(MediaTypes::PRINT);
        assert!(keep.matches());
    }

    #[test]
    fn test_color_scheme_change() {
        let viewport = Viewport::new(100, 100);
        let dark = viewport.match_media("(prefers-color-scheme: dark)").unwrap();
        assert!(!dark.matches());
        viewport.set_color_scheme(ColorScheme::Dark);
        assert!(dark.matches());
    }
}
