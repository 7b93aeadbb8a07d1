//! Polled keyboard input for the game loop.
//!
//! This crate provides:
//! - [`InputDispatcher`]: held-key table with per-key press/release handlers
//! - [`KeySink`] / [`KeyEvent`]: the boundary the host toolkit calls into
//! - [`BindingConfig`]: key bindings with save/load

mod binding_config;
mod dispatcher;
mod key_event;

pub use binding_config::{BINDING_CONFIG_FILE, BindingConfig, KeyBinding, vk};
pub use dispatcher::{InputDispatcher, KeyHandler};
pub use key_event::{KeyCode, KeyEvent, KeySink};
