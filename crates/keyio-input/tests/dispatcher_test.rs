//! Integration tests for keyio-input.

use std::sync::Arc;

use keyio_input::{BindingConfig, InputDispatcher, KeyBinding, KeyEvent, KeySink};
use parking_lot::Mutex;

const A: i32 = 65;
const B: i32 = 66;

type Log = Arc<Mutex<Vec<String>>>;

/// Dispatcher over {A -> "left", B -> "right"} logging `press:`/`release:`
/// entries for both keys.
fn setup() -> (InputDispatcher<String>, Log) {
    let dispatcher = BindingConfig {
        bindings: vec![KeyBinding::new(A, "left"), KeyBinding::new(B, "right")],
    }
    .into_dispatcher();
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    for code in [A, B] {
        let l = Arc::clone(&log);
        dispatcher.set_press_handler(code, move |b: &String| l.lock().push(format!("press:{b}")));
        let l = Arc::clone(&log);
        dispatcher.set_release_handler(code, move |b: &String| {
            l.lock().push(format!("release:{b}"))
        });
    }
    (dispatcher, log)
}

fn drain(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.lock())
}

/// Default mode, then once-per-press, across a release and re-press.
#[test]
fn test_press_modes_scenario() {
    let (d, log) = setup();

    d.dispatch(KeyEvent::down(A));
    d.scan();
    assert_eq!(drain(&log), vec!["press:left"]);
    d.scan();
    assert_eq!(drain(&log), vec!["press:left"]);

    d.read_press_once(A);
    d.scan();
    assert_eq!(drain(&log), vec!["press:left"]);
    d.scan();
    assert!(drain(&log).is_empty());

    d.dispatch(KeyEvent::up(A));
    assert_eq!(drain(&log), vec!["release:left"]);

    d.dispatch(KeyEvent::down(A));
    d.scan();
    assert_eq!(drain(&log), vec!["press:left"]);
}

/// Disabling press handling for B suppresses it until re-enabled.
#[test]
fn test_disable_press_scenario() {
    let (d, log) = setup();

    d.disable_press_handler(B);
    d.dispatch(KeyEvent::down(B));
    d.scan();
    assert!(drain(&log).is_empty());

    d.enable_press_handler(B);
    d.scan();
    assert_eq!(drain(&log), vec!["press:right"]);
}

/// Both keys held: one scan reports both, in key order.
#[test]
fn test_scan_reports_all_held_keys() {
    let (d, log) = setup();
    d.key_down(B);
    d.key_down(A);
    d.scan();
    assert_eq!(drain(&log), vec!["press:left", "press:right"]);
    assert_eq!(d.held_keys(), vec![A, B]);
}

/// Untracked codes leave every tracked key untouched.
#[test]
fn test_untracked_codes_are_ignored() {
    let (d, log) = setup();
    d.key_down(A);
    for code in [-1, 0, 1000, i32::MAX] {
        d.dispatch(KeyEvent::down(code));
        d.dispatch(KeyEvent::up(code));
        d.disable_press_handler(code);
        d.read_press_once(code);
    }
    d.scan();
    assert_eq!(drain(&log), vec!["press:left"]);
    assert!(d.is_held(A));
    assert!(!d.is_held(B));
}

/// Focus loss releases silently; the next press is a fresh hold.
#[test]
fn test_release_all_on_focus_loss() {
    let (d, log) = setup();
    d.read_press_once(A);
    d.key_down(A);
    d.scan();
    drain(&log);

    d.release_all();
    assert!(drain(&log).is_empty());
    d.scan();
    assert!(drain(&log).is_empty());

    d.key_down(A);
    d.scan();
    assert_eq!(drain(&log), vec!["press:left"]);
}
