//! Sprite frame sequencing.
//!
//! Decoding and slicing images is left to the renderer; this crate only
//! tracks which frame of an animation is current.

mod animator;

pub use animator::SpriteAnimator;
