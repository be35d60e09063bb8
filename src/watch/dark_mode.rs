//! Dark mode detector.
//!
//! Either a fixed choice or the system preference
//! (`(prefers-color-scheme: dark)`), exposed as a reactive signal.
//!
//! ```ignore
//! let dark = DarkMode::new(Some(env), DarkModeConfig::System)?;
//! let _stop = effect(move || println!("mode: {:?}", dark.display_mode()));
//! ```

use std::cell::RefCell;
use std::fmt;
use std::str::FromStr;

use spark_signals::{signal, Signal};

use super::media_query::{use_media_query, MediaQueryHandle};
use crate::env::SharedEnvironment;
use crate::error::{Result, ScreensError};

/// Query used for the system preference.
pub const PREFERS_DARK: &str = "(prefers-color-scheme: dark)";

/// Where the dark/light decision comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DarkModeConfig {
    Fixed(bool),
    System,
}

impl From<bool> for DarkModeConfig {
    fn from(dark: bool) -> Self {
        Self::Fixed(dark)
    }
}

impl FromStr for DarkModeConfig {
    type Err = ScreensError;

    /// Accepts `system`, `dark`/`true` and `light`/`false`, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" => Ok(Self::System),
            "dark" | "true" => Ok(Self::Fixed(true)),
            "light" | "false" => Ok(Self::Fixed(false)),
            other => Err(ScreensError::Configuration(format!(
                "unknown dark mode setting `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Light,
    Dark,
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Light => "light",
            Self::Dark => "dark",
        })
    }
}

/// Reactive dark mode state.
pub struct DarkMode {
    env: Option<SharedEnvironment>,
    config: RefCell<DarkModeConfig>,
    is_dark: Signal<bool>,
    watcher: RefCell<Option<MediaQueryHandle>>,
}

impl DarkMode {
    pub fn new(env: Option<SharedEnvironment>, config: DarkModeConfig) -> Result<Self> {
        let mode = Self {
            env,
            config: RefCell::new(config),
            is_dark: signal(false),
            watcher: RefCell::new(None),
        };
        mode.setup()?;
        Ok(mode)
    }

    fn setup(&self) -> Result<()> {
        self.stop_watcher();
        let config = *self.config.borrow();
        match config {
            DarkModeConfig::Fixed(dark) => {
                self.is_dark.set(dark);
            }
            DarkModeConfig::System => {
                let is_dark = self.is_dark.clone();
                let handle = use_media_query(self.env.as_ref(), PREFERS_DARK, move |dark| {
                    is_dark.set(dark);
                })?;
                *self.watcher.borrow_mut() = Some(handle);
            }
        }
        Ok(())
    }

    /// Switch source and re-evaluate.
    pub fn set_config(&self, config: DarkModeConfig) -> Result<()> {
        *self.config.borrow_mut() = config;
        self.setup()
    }

    pub fn config(&self) -> DarkModeConfig {
        *self.config.borrow()
    }

    pub fn is_dark(&self) -> bool {
        self.is_dark.get()
    }

    /// The underlying signal, for reactive tracking.
    pub fn is_dark_signal(&self) -> Signal<bool> {
        self.is_dark.clone()
    }

    pub fn display_mode(&self) -> DisplayMode {
        if self.is_dark() { DisplayMode::Dark } else { DisplayMode::Light }
    }

    /// Stop following the system preference. The last value is kept.
    pub fn cleanup(&self) {
        self.stop_watcher();
    }

    fn stop_watcher(&self) {
        let taken = self.watcher.borrow_mut().take();
        if let Some(handle) = taken {
            handle.stop();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{ColorScheme, Viewport};
    use spark_signals::effect;
    use std::cell::Cell;
    use std::rc::Rc;

    fn system() -> (Viewport, DarkMode) {
        let viewport = Viewport::new(800, 600);
        let mode = DarkMode::new(Some(Rc::new(viewport.clone())), DarkModeConfig::System).unwrap();
        (viewport, mode)
    }

    #[test]
    fn test_fixed() {
        let mode = DarkMode::new(None, true.into()).unwrap();
        assert!(mode.is_dark());
        assert_eq!(mode.display_mode(), DisplayMode::Dark);
        mode.set_config(false.into()).unwrap();
        assert_eq!(mode.display_mode(), DisplayMode::Light);
    }

    #[test]
    fn test_system_follows_environment() {
        let (viewport, mode) = system();
        assert!(!mode.is_dark());
        viewport.set_color_scheme(ColorScheme::Dark);
        assert!(mode.is_dark());
        viewport.set_color_scheme(ColorScheme::Light);
        assert!(!mode.is_dark());
    }

    #[test]
    fn test_initial_system_value() {
        let viewport = Viewport::new(800, 600);
        viewport.set_color_scheme(ColorScheme::Dark);
        let mode = DarkMode::new(Some(Rc::new(viewport)), DarkModeConfig::System).unwrap();
        assert!(mode.is_dark());
    }

    #[test]
    fn test_cleanup_stops_following() {
        let (viewport, mode) = system();
        mode.cleanup();
        mode.cleanup();
        viewport.set_color_scheme(ColorScheme::Dark);
        assert!(!mode.is_dark());
    }

    #[test]
    fn test_switch_from_system_to_fixed() {
        let (viewport, mode) = system();
        mode.set_config(DarkModeConfig::Fixed(true)).unwrap();
        viewport.set_color_scheme(ColorScheme::Light);
        assert!(mode.is_dark());
        assert_eq!(mode.config(), DarkModeConfig::Fixed(true));
    }

    #[test]
    fn test_system_without_environment_is_light() {
        let mode = DarkMode::new(None, DarkModeConfig::System).unwrap();
        assert!(!mode.is_dark());
    }

    #[test]
    fn test_signal_drives_effects() {
        let (viewport, mode) = system();
        let runs = Rc::new(Cell::new(0));
        let r = runs.clone();
        let sig = mode.is_dark_signal();
        let _stop = effect(move || {
            let _ = sig.get();
            r.set(r.get() + 1);
        });
        assert_eq!(runs.get(), 1);
        viewport.set_color_scheme(ColorScheme::Dark);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_parse_config() {
        assert_eq!("System".parse::<DarkModeConfig>().unwrap(), DarkModeConfig::System);
        assert_eq!("dark".parse::<DarkModeConfig>().unwrap(), DarkModeConfig::Fixed(true));
        assert_eq!("false".parse::<DarkModeConfig>().unwrap(), DarkModeConfig::Fixed(false));
        assert!("dim".parse::<DarkModeConfig>().is_err());
        assert_eq!(DisplayMode::Dark.to_string(), "dark");
    }
}
