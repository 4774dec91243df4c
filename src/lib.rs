//! Arcade simulation core.
//!
//! A small real-time engine for 2D arcade games: a scene graph of entities
//! with capability components, a synchronous event bus, pausable timers,
//! AABB physics against static obstacles, cubic-Hermite motion curves and a
//! software FM synthesizer. Windowing, drawing, keyboard and the audio device
//! are reached through the [`platform::Platform`] trait.

pub mod assets;
pub mod components;
pub mod engine;
pub mod events;
pub mod platform;
pub mod resources;
pub mod scene;
pub mod synth;
pub mod systems;

pub use engine::Engine;
pub use events::{Event, Sender};
pub use scene::{Entity, EntityId, Scene};
