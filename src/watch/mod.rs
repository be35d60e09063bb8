//! Watchers - single-purpose wrappers over the media environment.
//!
//! - [`use_media_query`] - one ad hoc query, callback on change
//! - [`DarkMode`] - fixed or system dark mode as a reactive signal

pub mod dark_mode;
pub mod media_query;

pub use dark_mode::{DarkMode, DarkModeConfig, DisplayMode, PREFERS_DARK};
pub use media_query::{use_media_query, MediaQueryHandle};
