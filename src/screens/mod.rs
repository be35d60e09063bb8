//! Screens Engine - named breakpoints with live match tracking.
//!
//! # Pipeline
//!
//! ```text
//! ScreensInput → normalize → build_media_query (per screen, cached)
//!              → Tracker (subscriptions + match map)
//!              → Views (list / current / resolve, version-cached)
//!              → Screens (merge layer callers hold)
//! ```
//!
//! All work runs synchronously on the caller's thread, inside either an
//! environment change notification or a read.

pub mod accessor;
pub mod normalize;
pub mod query;
pub mod tracker;
pub mod views;

pub use accessor::{
    CleanupFn, CurrentFn, ListFn, OpOverride, ScreenEntry, ScreenOp, ScreenWrite, Screens,
};
pub use normalize::normalize_screens;
pub use query::build_media_query;
pub use tracker::{Tracker, TrackerState};
pub use views::Views;
