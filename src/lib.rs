//! # Embers
//!
//! CPU-stepped particle emitters rendered as GPU billboards.
//!
//! Embers keeps the simulation on the CPU: each emitter owns a fixed-capacity
//! ring pool of particles, spawns them at a steady rate and retires them in
//! age order. Every frame the live particles are streamed to the GPU and drawn
//! as camera-facing textured quads, with color, size, rotation and sprite
//! frame all derived from each particle's age.
//!
//! ## Quick Start
//!
//! ```ignore
//! use embers::prelude::*;
//!
//! fn main() -> Result<(), embers::RunError> {
//!     env_logger::init();
//!
//!     let fire = EmitterSetup::new(
//!         Emitter::new(EmitterConfig::fire(Vec3::ZERO)),
//!         SpriteImage::soft_circle(64),
//!         StreamMode::CompactRecords,
//!     );
//!     run("fire", vec![fire])
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Emitters
//!
//! An [`Emitter`] pairs an [`EmitterConfig`] with a [`ParticlePool`]. The
//! config describes the effect (rate, lifetime, spawn jitter, the start/end
//! ramps for color, size and rotation) and can be edited at any time; the
//! pool holds the live particles in a ring so spawning and retiring never
//! move memory. Presets for common effects are on the config:
//! [`EmitterConfig::fire`], [`EmitterConfig::smoke`],
//! [`EmitterConfig::sparks`], [`EmitterConfig::fountain`].
//!
//! ### Closed-form motion
//!
//! A particle stores only its spawn state and age. Position is evaluated as
//! `p0 + v0*t + a*t^2/2` wherever it is needed, so the CPU and GPU paths
//! agree exactly and nothing is integrated frame by frame.
//!
//! ### Streaming modes
//!
//! [`StreamMode`] picks how live particles reach the GPU each frame:
//!
//! - [`StreamMode::ExpandedQuads`] expands every particle into four vertices
//!   on the CPU and draws one indexed quad per particle.
//! - [`StreamMode::CompactRecords`] uploads the raw 48-byte particle records
//!   and lets the vertex shader do the expansion, one instance per particle.
//!
//! Both paths evaluate the same motion and the same curves, so switching
//! modes never changes what ends up on screen.
//!
//! ### Sprite sheets
//!
//! A [`SpriteSheet`] plays a grid of texture frames over each particle's
//! life. [`SpriteImage::soft_circle`] and [`SpriteImage::soft_circle_sheet`]
//! generate usable placeholder textures when no asset is at hand.

mod camera;
mod config;
mod emitter;
mod error;
mod gpu;
mod particle;
mod pool;
mod render;
mod sprite;
pub mod stream;
mod texture;
pub mod time;
pub mod window;

pub use bytemuck;
pub use camera::Camera;
pub use config::{EmitterConfig, MIN_RATE};
pub use emitter::{Emitter, EmitterStats};
pub use error::{GpuError, RunError, TextureError};
pub use glam::{Vec2, Vec3, Vec4};
pub use gpu::{GpuContext, DEPTH_FORMAT};
pub use particle::Particle;
pub use pool::ParticlePool;
pub use render::{EmitterBuffers, ParticleRenderer, StreamMode};
pub use sprite::SpriteSheet;
pub use stream::QuadVertex;
pub use texture::{FilterMode, SpriteImage, SpriteTexture};
pub use window::{run, EmitterSetup};

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use embers::prelude::*;
/// ```
pub mod prelude {
    pub use crate::camera::Camera;
    pub use crate::config::EmitterConfig;
    pub use crate::emitter::{Emitter, EmitterStats};
    pub use crate::render::StreamMode;
    pub use crate::sprite::SpriteSheet;
    pub use crate::texture::{FilterMode, SpriteImage};
    pub use crate::time::Time;
    pub use crate::window::{run, EmitterSetup};
    pub use crate::{Vec2, Vec3, Vec4};
}
