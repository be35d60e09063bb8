//! Terminal host - a [`Viewport`] sized from the terminal.
//!
//! Terminal cells are mapped to pixels with a fixed cell size, so the usual
//! px breakpoints (`640px`, `1024px`, ...) work against column counts. With
//! the default 8px cells, an 80-column terminal is 640px wide.
//!
//! Resize events come from crossterm's event stream; there is no polling.
//! The size itself is reactive: cells and px dimensions live in signals, so
//! an `effect` reading [`TerminalViewport::width_signal`] re-runs on resize.
//!
//! ```ignore
//! let term = TerminalViewport::detect(TerminalConfig::default());
//! let screens = Screens::new(None, Some(term.environment()))?;
//! loop {
//!     let event = crossterm::event::read()?;
//!     term.handle_event(&event);
//! }
//! ```

use std::rc::Rc;

use crossterm::event::Event;
use serde::{Deserialize, Serialize};
use spark_signals::{batch, peek, signal, Signal};
use tracing::debug;

use super::viewport::Viewport;
use super::SharedEnvironment;

/// Cell-to-pixel mapping for terminal viewports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Pixels per column.
    pub cell_width: u16,
    /// Pixels per row.
    pub cell_height: u16,
}

impl TerminalConfig {
    /// Convert a cell size to px.
    pub fn to_px(&self, cols: u16, rows: u16) -> (u32, u32) {
        (
            u32::from(cols) * u32::from(self.cell_width),
            u32::from(rows) * u32::from(self.cell_height),
        )
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self { cell_width: 8, cell_height: 16 }
    }
}

/// Fallback size when the terminal cannot be queried.
const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// A viewport tracking terminal columns and rows.
///
/// Clones share the viewport and the size signals.
#[derive(Clone)]
pub struct TerminalViewport {
    viewport: Viewport,
    config: TerminalConfig,
    cols: Signal<u16>,
    rows: Signal<u16>,
    width: Signal<u32>,
    height: Signal<u32>,
}

impl TerminalViewport {
    /// Create a viewport for a terminal of `cols` x `rows`.
    pub fn new(cols: u16, rows: u16, config: TerminalConfig) -> Self {
        let (width, height) = config.to_px(cols, rows);
        let viewport = Viewport::default();
        viewport.update(|f| {
            f.cell_width = f32::from(config.cell_width);
            f.width = width as f32;
            f.height = height as f32;
        });
        Self {
            viewport,
            config,
            cols: signal(cols),
            rows: signal(rows),
            width: signal(width),
            height: signal(height),
        }
    }

    /// Create a viewport from the actual terminal size.
    ///
    /// Falls back to 80x24 when stdout is not a terminal.
    pub fn detect(config: TerminalConfig) -> Self {
        let (cols, rows) = crossterm::terminal::size().unwrap_or_else(|err| {
            debug!(error = %err, "terminal size unavailable, using fallback");
            FALLBACK_SIZE
        });
        Self::new(cols, rows, config)
    }

    /// Terminal size in cells.
    pub fn size(&self) -> (u16, u16) {
        (self.cols.get(), self.rows.get())
    }

    /// Viewport size in px.
    pub fn px_size(&self) -> (u32, u32) {
        (self.width.get(), self.height.get())
    }

    /// Columns, for reactive tracking.
    pub fn cols_signal(&self) -> Signal<u16> {
        self.cols.clone()
    }

    /// Rows, for reactive tracking.
    pub fn rows_signal(&self) -> Signal<u16> {
        self.rows.clone()
    }

    /// Width in px, for reactive tracking.
    pub fn width_signal(&self) -> Signal<u32> {
        self.width.clone()
    }

    /// Height in px, for reactive tracking.
    pub fn height_signal(&self) -> Signal<u32> {
        self.height.clone()
    }

    pub fn config(&self) -> TerminalConfig {
        self.config
    }

    /// The underlying pixel viewport.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// This terminal as an engine environment.
    pub fn environment(&self) -> SharedEnvironment {
        Rc::new(self.viewport.clone())
    }

    /// Apply a terminal resize (in cells).
    ///
    /// Media queries are notified first, then the size signals change in one
    /// batch, so effects reading both see a consistent state.
    pub fn resize(&self, cols: u16, rows: u16) {
        if peek(|| self.size()) == (cols, rows) {
            return;
        }
        debug!(cols, rows, "terminal resized");
        let (width, height) = self.config.to_px(cols, rows);
        self.viewport.resize(width, height);
        batch(|| {
            self.cols.set(cols);
            self.rows.set(rows);
            self.width.set(width);
            self.height.set(height);
        });
    }

    /// Route a crossterm event. Returns true if it was a resize.
    pub fn handle_event(&self, event: &Event) -> bool {
        match event {
            Event::Resize(cols, rows) => {
                self.resize(*cols, *rows);
                true
            }
            _ => false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
