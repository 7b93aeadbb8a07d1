use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::dispatcher::InputDispatcher;
use crate::key_event::KeyCode;

pub const BINDING_CONFIG_FILE: &str = "bindings.json";

/// AWT virtual key codes used by the default bindings.
pub mod vk {
    use crate::key_event::KeyCode;

    pub const SPACE: KeyCode = 32;
    pub const LEFT: KeyCode = 37;
    pub const UP: KeyCode = 38;
    pub const RIGHT: KeyCode = 39;
    pub const DOWN: KeyCode = 40;
}

/// One tracked key and the action it is bound to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub action: String,
    /// Fire the press handler once per hold instead of every scan.
    #[serde(default)]
    pub once_per_press: bool,
}

impl KeyBinding {
    pub fn new(code: KeyCode, action: impl Into<String>) -> Self {
        Self {
            code,
            action: action.into(),
            once_per_press: false,
        }
    }

    pub fn once(mut self) -> Self {
        self.once_per_press = true;
        self
    }
}

/// The set of keys a dispatcher tracks and the action names bound to them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BindingConfig {
    pub bindings: Vec<KeyBinding>,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            bindings: vec![
                KeyBinding::new(vk::LEFT, "left"),
                KeyBinding::new(vk::UP, "up"),
                KeyBinding::new(vk::RIGHT, "right"),
                KeyBinding::new(vk::DOWN, "down"),
                KeyBinding::new(vk::SPACE, "jump").once(),
            ],
        }
    }
}

impl BindingConfig {
    /// Load from [`BINDING_CONFIG_FILE`] in the working directory.
    pub fn load() -> Result<Self> {
        Self::load_from(BINDING_CONFIG_FILE)
    }

    /// Load from a file. A missing file yields the default bindings.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No binding config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read binding config {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse binding config {}", path.display()))?;
        config.validate()?;
        debug!(
            "Loaded {} key bindings from {}",
            config.bindings.len(),
            path.display()
        );
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(BINDING_CONFIG_FILE)
    }

    /// Write as pretty JSON, creating parent directories.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize bindings")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write binding config {}", path.display()))?;
        Ok(())
    }

    /// Reject duplicated key codes and blank action names.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for binding in &self.bindings {
            if binding.action.trim().is_empty() {
                bail!("Key {} has an empty action name", binding.code);
            }
            if !seen.insert(binding.code) {
                bail!("Key {} is bound more than once", binding.code);
            }
        }
        Ok(())
    }

    /// Build a dispatcher tracking every bound key, with its action name as
    /// the binding. Keys flagged `once_per_press` start in that mode.
    pub fn into_dispatcher(self) -> InputDispatcher<String> {
        let once: Vec<KeyCode> = self
            .bindings
            .iter()
            .filter(|b| b.once_per_press)
            .map(|b| b.code)
            .collect();
        let dispatcher =
            InputDispatcher::new(self.bindings.into_iter().map(|b| (b.code, b.action)));
        for code in once {
            dispatcher.read_press_once(code);
        }
        dispatcher
    }
}
