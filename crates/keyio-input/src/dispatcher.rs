use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, trace};
use parking_lot::{Mutex, RwLock};

use crate::key_event::{KeyCode, KeySink};

/// Callback attached to a key. Receives the key's binding.
pub type KeyHandler<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A tracked key: its client binding and whether it is currently held.
struct TrackedKey<T> {
    binding: T,
    held: AtomicBool,
}

/// Polled keyboard dispatcher.
///
/// The host toolkit feeds [`key_down`](Self::key_down) and
/// [`key_up`](Self::key_up) from its event thread; the client calls
/// [`scan`](Self::scan) from its own loop. Press handlers run during `scan`
/// for every held key, release handlers run inline on `key_up`.
///
/// The set of tracked keys is fixed at construction. Intake and scan ignore
/// any other code. Handler registration, enable/disable and once-per-press
/// toggles accept any code but entries for untracked codes stay dormant:
/// they are stored and never consulted.
///
/// No lock is held while a handler runs, so handlers may reconfigure the
/// dispatcher they were called from.
pub struct InputDispatcher<T> {
    keys: BTreeMap<KeyCode, TrackedKey<T>>,
    press_handlers: RwLock<HashMap<KeyCode, KeyHandler<T>>>,
    release_handlers: RwLock<HashMap<KeyCode, KeyHandler<T>>>,
    disabled_press: RwLock<HashSet<KeyCode>>,
    disabled_release: RwLock<HashSet<KeyCode>>,
    /// Keys in once-per-press mode, mapped to "already fired during this hold".
    once_per_press: Mutex<HashMap<KeyCode, bool>>,
}

impl<T> InputDispatcher<T> {
    /// Create a dispatcher tracking the given keys. A repeated code keeps its
    /// last binding.
    pub fn new<I>(bindings: I) -> Self
    where
        I: IntoIterator<Item = (KeyCode, T)>,
    {
        let keys: BTreeMap<_, _> = bindings
            .into_iter()
            .map(|(code, binding)| {
                (
                    code,
                    TrackedKey {
                        binding,
                        held: AtomicBool::new(false),
                    },
                )
            })
            .collect();
        debug!("Input dispatcher tracking {} keys", keys.len());

        Self {
            keys,
            press_handlers: RwLock::new(HashMap::new()),
            release_handlers: RwLock::new(HashMap::new()),
            disabled_press: RwLock::new(HashSet::new()),
            disabled_release: RwLock::new(HashSet::new()),
            once_per_press: Mutex::new(HashMap::new()),
        }
    }

    // ---------------------------------------------------------------------
    // Event intake
    // ---------------------------------------------------------------------

    /// Mark a key as held. Never invokes a handler.
    pub fn key_down(&self, code: KeyCode) {
        match self.keys.get(&code) {
            Some(key) => {
                key.held.store(true, Ordering::Release);
                trace!("Key {} down", code);
            }
            None => trace!("Ignoring key down for untracked key {}", code),
        }
    }

    /// Mark a key as released, re-arm its once-per-press flag, then run its
    /// release handler if enabled.
    pub fn key_up(&self, code: KeyCode) {
        let Some(key) = self.keys.get(&code) else {
            trace!("Ignoring key up for untracked key {}", code);
            return;
        };
        // Held must be cleared before the once lock is taken; see claim_press.
        key.held.store(false, Ordering::Release);
        if let Some(fired) = self.once_per_press.lock().get_mut(&code) {
            *fired = false;
        }
        trace!("Key {} up", code);

        if !self.release_handler_is_disabled(code) {
            let handler = self.release_handlers.read().get(&code).cloned();
            if let Some(handler) = handler {
                handler(&key.binding);
            }
        }
    }

    /// Release every tracked key without running release handlers.
    ///
    /// For focus loss, when the host will not deliver the pending key ups.
    pub fn release_all(&self) {
        for key in self.keys.values() {
            key.held.store(false, Ordering::Release);
        }
        for fired in self.once_per_press.lock().values_mut() {
            *fired = false;
        }
        debug!("Released all keys");
    }

    // ---------------------------------------------------------------------
    // Scan
    // ---------------------------------------------------------------------

    /// Run the press handler of every held key, in ascending key order.
    ///
    /// Keys in once-per-press mode fire on the first scan of a hold only.
    pub fn scan(&self) {
        for (&code, key) in &self.keys {
            if !key.held.load(Ordering::Acquire) || self.press_handler_is_disabled(code) {
                continue;
            }
            let Some(handler) = self.press_handlers.read().get(&code).cloned() else {
                continue;
            };
            if !self.claim_press(code, key) {
                trace!("Key {} already fired during this press", code);
                continue;
            }
            handler(&key.binding);
        }
    }

    /// Whether a press may fire now. Consumes the once-per-press flag.
    ///
    /// Held is re-read under the once lock: a key up that completed since
    /// the scan's first check has already cleared held, so a stale scan can
    /// not mark the next hold as fired.
    fn claim_press(&self, code: KeyCode, key: &TrackedKey<T>) -> bool {
        let mut once = self.once_per_press.lock();
        match once.get_mut(&code) {
            None => true,
            Some(_) if !key.held.load(Ordering::Acquire) => false,
            Some(fired) if *fired => false,
            Some(fired) => {
                *fired = true;
                true
            }
        }
    }

    // ---------------------------------------------------------------------
    // Handler registry
    // ---------------------------------------------------------------------

    /// Register or replace the handler run by [`scan`](Self::scan) while
    /// `code` is held.
    pub fn set_press_handler<F>(&self, code: KeyCode, handler: F)
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.press_handlers.write().insert(code, Arc::new(handler));
        debug!("Press handler set for key {}", code);
    }

    /// Register or replace the handler run when `code` is released.
    pub fn set_release_handler<F>(&self, code: KeyCode, handler: F)
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.release_handlers.write().insert(code, Arc::new(handler));
        debug!("Release handler set for key {}", code);
    }

    pub fn has_press_handler(&self, code: KeyCode) -> bool {
        self.press_handlers.read().contains_key(&code)
    }

    pub fn has_release_handler(&self, code: KeyCode) -> bool {
        self.release_handlers.read().contains_key(&code)
    }

    // ---------------------------------------------------------------------
    // Enable / disable
    // ---------------------------------------------------------------------

    /// Suppress the press handler of `code`. The handler stays registered.
    pub fn disable_press_handler(&self, code: KeyCode) {
        if self.disabled_press.write().insert(code) {
            debug!("Press handler disabled for key {}", code);
        }
    }

    /// Suppress the release handler of `code`. The handler stays registered.
    pub fn disable_release_handler(&self, code: KeyCode) {
        if self.disabled_release.write().insert(code) {
            debug!("Release handler disabled for key {}", code);
        }
    }

    pub fn enable_press_handler(&self, code: KeyCode) {
        if self.disabled_press.write().remove(&code) {
            debug!("Press handler enabled for key {}", code);
        }
    }

    pub fn enable_release_handler(&self, code: KeyCode) {
        if self.disabled_release.write().remove(&code) {
            debug!("Release handler enabled for key {}", code);
        }
    }

    pub fn disable_all_press_handlers(&self) {
        self.disabled_press.write().extend(self.keys.keys().copied());
        debug!("All press handlers disabled");
    }

    pub fn disable_all_release_handlers(&self) {
        self.disabled_release.write().extend(self.keys.keys().copied());
        debug!("All release handlers disabled");
    }

    pub fn enable_all_press_handlers(&self) {
        let mut disabled = self.disabled_press.write();
        for code in self.keys.keys() {
            disabled.remove(code);
        }
        debug!("All press handlers enabled");
    }

    pub fn enable_all_release_handlers(&self) {
        let mut disabled = self.disabled_release.write();
        for code in self.keys.keys() {
            disabled.remove(code);
        }
        debug!("All release handlers enabled");
    }

    pub fn disable_all_handlers(&self) {
        self.disable_all_press_handlers();
        self.disable_all_release_handlers();
    }

    pub fn enable_all_handlers(&self) {
        self.enable_all_press_handlers();
        self.enable_all_release_handlers();
    }

    pub fn press_handler_is_disabled(&self, code: KeyCode) -> bool {
        self.disabled_press.read().contains(&code)
    }

    pub fn release_handler_is_disabled(&self, code: KeyCode) -> bool {
        self.disabled_release.read().contains(&code)
    }

    // ---------------------------------------------------------------------
    // Once-per-press mode
    // ---------------------------------------------------------------------

    /// Fire the press handler of `code` once per continuous hold.
    ///
    /// A key already in this mode keeps its current fired flag.
    pub fn read_press_once(&self, code: KeyCode) {
        let mut once = self.once_per_press.lock();
        if !once.contains_key(&code) {
            once.insert(code, false);
            debug!("Key {} reads press once", code);
        }
    }

    /// Fire the press handler of `code` on every scan while held (default).
    pub fn read_press_always(&self, code: KeyCode) {
        if self.once_per_press.lock().remove(&code).is_some() {
            debug!("Key {} reads press always", code);
        }
    }

    pub fn is_read_press_once(&self, code: KeyCode) -> bool {
        self.once_per_press.lock().contains_key(&code)
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn is_tracked(&self, code: KeyCode) -> bool {
        self.keys.contains_key(&code)
    }

    /// Whether `code` is currently held. Always `false` for untracked keys.
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.keys
            .get(&code)
            .is_some_and(|key| key.held.load(Ordering::Acquire))
    }

    /// The binding of a tracked key.
    pub fn binding(&self, code: KeyCode) -> Option<&T> {
        self.keys.get(&code).map(|key| &key.binding)
    }

    /// Tracked key codes in scan order.
    pub fn tracked_keys(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.keys.keys().copied()
    }

    /// Currently held keys in scan order.
    pub fn held_keys(&self) -> Vec<KeyCode> {
        self.keys
            .iter()
            .filter(|(_, key)| key.held.load(Ordering::Acquire))
            .map(|(&code, _)| code)
            .collect()
    }
}

impl<T> KeySink for InputDispatcher<T> {
    fn key_down(&self, code: KeyCode) {
        InputDispatcher::key_down(self, code);
    }

    fn key_up(&self, code: KeyCode) {
        InputDispatcher::key_up(self, code);
    }
}

impl<T> std::fmt::Debug for InputDispatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputDispatcher")
            .field("tracked", &self.keys.keys().collect::<Vec<_>>())
            .field("held", &self.held_keys())
            .finish_non_exhaustive()
    }
}
