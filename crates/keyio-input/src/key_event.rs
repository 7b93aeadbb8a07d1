use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Key identifier as reported by the host toolkit.
pub type KeyCode = i32;

/// A single key transition delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyEvent {
    pub code: KeyCode,
    /// true = pressed, false = released.
    pub pressed: bool,
}

impl KeyEvent {
    pub fn down(code: KeyCode) -> Self {
        Self {
            code,
            pressed: true,
        }
    }

    pub fn up(code: KeyCode) -> Self {
        Self {
            code,
            pressed: false,
        }
    }
}

/// Receiver of host key notifications.
///
/// Implementations are called from the host's event thread, so both entry
/// points take `&self`.
pub trait KeySink {
    fn key_down(&self, code: KeyCode);

    fn key_up(&self, code: KeyCode);

    /// Route an event to [`key_down`](Self::key_down) or [`key_up`](Self::key_up).
    fn dispatch(&self, event: KeyEvent) {
        if event.pressed {
            self.key_down(event.code);
        } else {
            self.key_up(event.code);
        }
    }
}

impl<S: KeySink + ?Sized> KeySink for Arc<S> {
    fn key_down(&self, code: KeyCode) {
        (**self).key_down(code);
    }

    fn key_up(&self, code: KeyCode) {
        (**self).key_up(code);
    }
}
