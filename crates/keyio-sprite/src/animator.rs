use anyhow::{Result, bail};
use log::trace;

/// Cycles through a fixed list of frames.
///
/// There is no internal timer. The client calls [`update`](Self::update)
/// from its own tick, for instance from a press handler.
#[derive(Debug, Clone)]
pub struct SpriteAnimator<F> {
    frames: Vec<F>,
    index: usize,
}

impl<F> SpriteAnimator<F> {
    /// Create an animator positioned on the first frame.
    pub fn new(frames: Vec<F>) -> Result<Self> {
        if frames.is_empty() {
            bail!("Sprite animator needs at least one frame");
        }
        Ok(Self { frames, index: 0 })
    }

    /// Advance to the next frame, wrapping after the last one.
    pub fn update(&mut self) {
        self.index = (self.index + 1) % self.frames.len();
        trace!("Sprite frame {}/{}", self.index, self.frames.len());
    }

    /// Return to the first frame.
    pub fn reset(&mut self) {
        self.index = 0;
    }

    pub fn current_frame(&self) -> &F {
        &self.frames[self.index]
    }

    pub fn frame_index(&self) -> usize {
        self.index
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}
