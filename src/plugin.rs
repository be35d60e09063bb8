//! Application glue - sharing one engine under a lookup key.
//!
//! A [`ScreensRegistry`] is the application-wide context components read
//! engines from. [`use_screens`] builds an engine, provides it, and returns a
//! scope guard that cleans the engine up when the owning component goes away.
//!
//! ```ignore
//! let registry = ScreensRegistry::new();
//! let scope = use_screens(&registry, None, Some(env), &ScreensOptions::default())?;
//!
//! // anywhere with access to the registry
//! let screens = registry.inject(DEFAULT_INJECT_KEY).unwrap();
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Deref;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::env::SharedEnvironment;
use crate::error::Result;
use crate::screens::Screens;
use crate::types::ScreensInput;

/// Key engines are provided under unless configured otherwise.
pub const DEFAULT_INJECT_KEY: &str = "$screens";

/// Options for [`use_screens`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreensOptions {
    pub inject_key: String,
}

impl Default for ScreensOptions {
    fn default() -> Self {
        Self { inject_key: DEFAULT_INJECT_KEY.to_string() }
    }
}

/// Engines by lookup key. Clones share the same registry.
#[derive(Clone, Default)]
pub struct ScreensRegistry {
    entries: Rc<RefCell<HashMap<String, Screens>>>,
}

impl ScreensRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `screens` under `key`, returning any engine it replaced.
    pub fn provide(&self, key: impl Into<String>, screens: Screens) -> Option<Screens> {
        self.entries.borrow_mut().insert(key.into(), screens)
    }

    pub fn inject(&self, key: &str) -> Option<Screens> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn remove(&self, key: &str) -> Option<Screens> {
        self.entries.borrow_mut().remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

/// Owns a provided engine. Dropping it cleans the engine up and withdraws it
/// from the registry (unless the key has since been re-provided).
pub struct ScreensScope {
    screens: Screens,
    registry: ScreensRegistry,
    key: String,
}

impl ScreensScope {
    pub fn screens(&self) -> &Screens {
        &self.screens
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Deref for ScreensScope {
    type Target = Screens;

    fn deref(&self) -> &Screens {
        &self.screens
    }
}

impl Drop for ScreensScope {
    fn drop(&mut self) {
        self.screens.cleanup();
        let provided = self.registry.inject(&self.key);
        if provided.is_some_and(|p| p.same_engine(&self.screens)) {
            self.registry.remove(&self.key);
        }
        debug!(key = %self.key, "screens scope dropped");
    }
}

/// Build an engine, provide it under `options.inject_key`, and tie its
/// lifetime to the returned scope.
pub fn use_screens(
    registry: &ScreensRegistry,
    input: Option<ScreensInput>,
    env: Option<SharedEnvironment>,
    options: &ScreensOptions,
) -> Result<ScreensScope> {
    let screens = Screens::new(input, env)?;
    registry.provide(options.inject_key.clone(), screens.clone());
    debug!(key = %options.inject_key, "screens provided");
    Ok(ScreensScope {
        screens,
        registry: registry.clone(),
        key: options.inject_key.clone(),
    })
}

// =============================================================================
// Tests
// =============================================================================
