use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use keyio_input::{BindingConfig, InputDispatcher, KeyCode};
use keyio_sprite::SpriteAnimator;
use log::info;
use parking_lot::Mutex;

/// Frames in each action's walk cycle.
const FRAMES_PER_ACTION: usize = 4;

type Animators = Arc<Mutex<BTreeMap<KeyCode, SpriteAnimator<usize>>>>;

/// Minimal game loop: one animator per bound key, advanced while the key is
/// held and rewound on release. Keys sharing an action animate independently.
pub struct Game {
    dispatcher: Arc<InputDispatcher<String>>,
    animators: Animators,
}

impl Game {
    pub fn new(config: BindingConfig) -> Result<Self> {
        let mut animators = BTreeMap::new();
        for binding in &config.bindings {
            let frames: Vec<usize> = (0..FRAMES_PER_ACTION).collect();
            animators.insert(binding.code, SpriteAnimator::new(frames)?);
        }
        let animators: Animators = Arc::new(Mutex::new(animators));
        let dispatcher = Arc::new(config.into_dispatcher());

        for code in dispatcher.tracked_keys() {
            let anims = Arc::clone(&animators);
            dispatcher.set_press_handler(code, move |action: &String| {
                if let Some(anim) = anims.lock().get_mut(&code) {
                    anim.update();
                    info!("{} (frame {})", action, anim.frame_index());
                }
            });
            let anims = Arc::clone(&animators);
            dispatcher.set_release_handler(code, move |action: &String| {
                if let Some(anim) = anims.lock().get_mut(&code) {
                    anim.reset();
                }
                info!("{} released", action);
            });
        }

        Ok(Self {
            dispatcher,
            animators,
        })
    }

    /// Handle for the host event thread.
    pub fn dispatcher(&self) -> Arc<InputDispatcher<String>> {
        Arc::clone(&self.dispatcher)
    }

    /// One frame of game logic.
    pub fn tick(&self) {
        self.dispatcher.scan();
    }

    /// Run `ticks` frames, sleeping `tick_period` between them.
    pub fn run(&self, ticks: u32, tick_period: Duration) {
        for i in 0..ticks {
            self.tick();
            if i + 1 < ticks {
                thread::sleep(tick_period);
            }
        }
    }

    /// Current frame index of every bound key's animator.
    pub fn frames(&self) -> BTreeMap<KeyCode, usize> {
        self.animators
            .lock()
            .iter()
            .map(|(code, anim)| (*code, anim.frame_index()))
            .collect()
    }

    pub fn held_actions(&self) -> Vec<String> {
        self.dispatcher
            .held_keys()
            .into_iter()
            .filter_map(|code| self.dispatcher.binding(code).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyio_input::{KeyBinding, vk};
    use std::time::Instant;

    #[test]
    fn test_held_key_advances_animator() {
        let game = Game::new(BindingConfig::default()).unwrap();
        let dispatcher = game.dispatcher();

        dispatcher.key_down(vk::RIGHT);
        game.tick();
        game.tick();
        assert_eq!(game.frames()[&vk::RIGHT], 2);
        assert_eq!(game.held_actions(), vec!["right".to_string()]);

        dispatcher.key_up(vk::RIGHT);
        assert_eq!(game.frames()[&vk::RIGHT], 0);
        assert!(game.held_actions().is_empty());
    }

    #[test]
    fn test_jump_fires_once_per_press() {
        let game = Game::new(BindingConfig::default()).unwrap();
        let dispatcher = game.dispatcher();

        dispatcher.key_down(vk::SPACE);
        for _ in 0..5 {
            game.tick();
        }
        assert_eq!(game.frames()[&vk::SPACE], 1);
    }

    #[test]
    fn test_animator_wraps_during_long_hold() {
        let config = BindingConfig {
            bindings: vec![KeyBinding::new(1, "spin")],
        };
        let game = Game::new(config).unwrap();
        game.dispatcher().key_down(1);
        for _ in 0..FRAMES_PER_ACTION + 1 {
            game.tick();
        }
        assert_eq!(game.frames()[&1], 1);
    }

    #[test]
    fn test_keys_sharing_an_action_animate_independently() {
        let config = BindingConfig {
            bindings: vec![
                KeyBinding::new(vk::LEFT, "walk"),
                KeyBinding::new(vk::RIGHT, "walk"),
            ],
        };
        let game = Game::new(config).unwrap();
        let dispatcher = game.dispatcher();

        dispatcher.key_down(vk::LEFT);
        game.tick();
        dispatcher.key_down(vk::RIGHT);
        game.tick();
        assert_eq!(game.frames()[&vk::LEFT], 2);
        assert_eq!(game.frames()[&vk::RIGHT], 1);

        dispatcher.key_up(vk::LEFT);
        assert_eq!(game.frames()[&vk::LEFT], 0);
        assert_eq!(game.frames()[&vk::RIGHT], 1);
    }

    #[test]
    fn test_run_does_not_sleep_after_last_tick() {
        let game = Game::new(BindingConfig::default()).unwrap();
        game.dispatcher().key_down(vk::RIGHT);

        let period = Duration::from_secs(5);
        let started = Instant::now();
        game.run(1, period);
        assert!(started.elapsed() < period);
        assert_eq!(game.frames()[&vk::RIGHT], 1);

        let started = Instant::now();
        game.run(0, period);
        assert!(started.elapsed() < period);
    }
}
