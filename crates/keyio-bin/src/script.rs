use std::fs;
use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use keyio_input::{KeyEvent, KeySink, vk};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// A host event scheduled for a given game tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub tick: u32,
    #[serde(flatten)]
    pub event: KeyEvent,
}

impl ScriptStep {
    pub fn new(tick: u32, event: KeyEvent) -> Self {
        Self { tick, event }
    }
}

/// Recorded host key events, ordered by tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputScript {
    steps: Vec<ScriptStep>,
}

impl InputScript {
    pub fn new(mut steps: Vec<ScriptStep>) -> Self {
        steps.sort_by_key(|s| s.tick);
        Self { steps }
    }

    /// Walk right, jump while walking, then tap left.
    pub fn demo() -> Self {
        Self::new(vec![
            ScriptStep::new(2, KeyEvent::down(vk::RIGHT)),
            ScriptStep::new(6, KeyEvent::down(vk::SPACE)),
            ScriptStep::new(14, KeyEvent::up(vk::SPACE)),
            ScriptStep::new(20, KeyEvent::up(vk::RIGHT)),
            ScriptStep::new(24, KeyEvent::down(vk::LEFT)),
            ScriptStep::new(26, KeyEvent::up(vk::LEFT)),
        ])
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read input script {}", path.display()))?;
        let steps: Vec<ScriptStep> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse input script {}", path.display()))?;
        debug!("Loaded {} script steps from {}", steps.len(), path.display());
        Ok(Self::new(steps))
    }

    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }

    /// Drop steps scheduled at or after `ticks`.
    pub fn truncate(&mut self, ticks: u32) {
        self.steps.retain(|s| s.tick < ticks);
    }

    /// Replay the script on a dedicated host thread, as a UI toolkit would
    /// deliver events from its own event loop.
    pub fn replay<S>(self, sink: S, tick_period: Duration) -> Result<JoinHandle<()>>
    where
        S: KeySink + Send + 'static,
    {
        thread::Builder::new()
            .name("host-events".to_string())
            .spawn(move || {
                let start = Instant::now();
                for step in self.steps {
                    let due = start + tick_period * step.tick;
                    if let Some(wait) = due.checked_duration_since(Instant::now()) {
                        thread::sleep(wait);
                    }
                    trace!("Host delivers {:?} at tick {}", step.event, step.tick);
                    sink.dispatch(step.event);
                }
            })
            .context("Failed to spawn host event thread")
    }
}
