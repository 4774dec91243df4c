//! Seam between the simulation core and the host platform.
//!
//! Windowing, drawing, keyboard polling and the audio device are external
//! collaborators. The [`Engine`](crate::engine::Engine) reaches them only
//! through the [`Platform`] trait:
//! - the platform supplies wall time and the key snapshot each tick,
//! - the engine hands it the frame's [`DrawCommand`]s and the sprite table,
//! - at init the engine hands it the audio [`Mixer`], which the platform
//!   drives from its audio callback via [`Mixer::fill`].
//!
//! [`headless::HeadlessPlatform`] runs the engine without any window.

pub mod headless;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::bounds::Aabb;
use crate::resources::gameconfig::EngineConfig;
use crate::resources::input::KeyStatus;
use crate::resources::spritestore::{SpriteRef, SpriteStore};
use crate::scene::EntityId;
use crate::systems::audio::Mixer;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("failed to open window: {0}")]
    Window(String),
    #[error("failed to open audio device: {0}")]
    Audio(String),
    #[error("platform is not open")]
    NotOpen,
}

/// View size in world units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

impl Dimension {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The view rectangle, anchored at the origin.
    pub fn rect(&self) -> Aabb {
        Aabb::from_size(Vec2::new(self.width as f32, self.height as f32))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// One sprite to draw this frame, in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub entity: EntityId,
    pub sprite: SpriteRef,
    pub rect: Aabb,
}

/// Host services the engine needs.
pub trait Platform {
    /// Create the window (or equivalent). Called once from `Engine::init`.
    fn open(
        &mut self,
        title: &str,
        dimensions: Dimension,
        scale: u32,
        background: Rgba,
    ) -> Result<(), PlatformError>;

    /// Monotonic wall time in seconds.
    fn elapsed_seconds(&self) -> f64;

    /// Fill `keys` with the current key state. Returns `true` when the user
    /// asked to quit.
    fn poll_input(&mut self, keys: &mut KeyStatus) -> bool;

    /// Draw one frame.
    fn present(&mut self, commands: &[DrawCommand], sprites: &SpriteStore);

    /// Take ownership of the mixer and start pulling samples from it.
    fn start_audio(&mut self, mixer: Mixer, config: &EngineConfig) -> Result<(), PlatformError>;

    /// Release everything acquired by `open` and `start_audio`.
    fn close(&mut self);
}
