//! # spark-screens
//!
//! Reactive responsive breakpoints for Rust.
//!
//! Declare named breakpoints, compile each into a media query, and keep a
//! live `name -> bool` match map that updates on the host's change
//! notifications (no polling). On top of the map: the active breakpoint
//! list, the current breakpoint, and a resolver from breakpoints to values.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals): reading
//! an engine inside an `effect` re-runs the effect when matches change.
//!
//! ## Architecture
//!
//! ```text
//! ScreensInput → normalize → build_media_query → Tracker → Views → Screens
//!                                                   ▲
//!                          MediaEnvironment ────────┘ (change notifications)
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Input shapes, normalized screens, resolver config
//! - [`screens`] - The engine: normalizer, compiler, tracker, views, accessor
//! - [`env`] - Host boundary plus the viewport and terminal hosts
//! - [`watch`] - Single-query watcher and dark mode detector
//! - [`plugin`] - Registry for sharing an engine under a lookup key
//!
//! ## Example
//!
//! ```ignore
//! use spark_screens::{Screens, ScreensConfig, TerminalConfig, TerminalViewport};
//!
//! let term = TerminalViewport::detect(TerminalConfig::default());
//! let screens = Screens::new(None, Some(term.environment()))?;
//!
//! let columns = screens.resolve(&ScreensConfig::new().with("md", 2).with("lg", 3), Some(1));
//! ```

pub mod env;
pub mod error;
pub mod plugin;
pub mod screens;
pub mod types;
pub mod watch;

pub use error::{Result, ScreensError};
pub use types::*;

pub use screens::{
    build_media_query, normalize_screens, OpOverride, ScreenEntry, ScreenOp, ScreenWrite,
    Screens, TrackerState,
};

pub use env::{
    ColorScheme, Headless, ListenerId, MediaEnvironment, MediaFeatures, MediaListener,
    MediaQuery, MediaQueryList, MediaTypes, SharedEnvironment, TerminalConfig, TerminalViewport,
    Viewport,
};

pub use watch::{use_media_query, DarkMode, DarkModeConfig, DisplayMode, MediaQueryHandle};

pub use plugin::{use_screens, ScreensOptions, ScreensRegistry, ScreensScope, DEFAULT_INJECT_KEY};
