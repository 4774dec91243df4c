//! Engine systems.
//!
//! Free functions that advance the simulation. Each takes the
//! [`Engine`](crate::engine::Engine) and, where it works per entity, the
//! [`EntityId`](crate::scene::EntityId) to update.
//!
//! Submodules overview
//! - [`animation`] – start curves and move entities along them
//! - [`audio`] – the mixer, and handing queued sounds to it
//! - [`collision`] – obstacle collection, AABB response and view boundary
//! - [`graphics`] – collect draw commands for the renderer
//! - [`input`] – run input controllers
//! - [`movement`] – velocity and gravity integration
//! - [`physics`] – per-entity physics step emitting collision/view events
//! - [`scene`] – recursive init/reset/update passes over the tree
//! - [`time`] – advance the clocks and fire due timers

pub mod animation;
pub mod audio;
pub mod collision;
pub mod graphics;
pub mod input;
pub mod movement;
pub mod physics;
pub mod scene;
pub mod time;
