//! Long-lived engine state shared by the systems.
//!
//! These are owned by the [`Engine`](crate::engine::Engine) root and read or
//! mutated during the per-frame tick. Each submodule documents the semantics
//! and intended usage of its resource(s).
//!
//! Overview
//! - `audio` – channels between the simulation and the audio callback
//! - `gameconfig` – INI-backed engine configuration
//! - `input` – per-frame key snapshot
//! - `spritestore` – sprite table handed to the renderer
//! - `timers` – one-shot timers on the effective and accumulative clocks
//! - `worldtime` – the two simulation clocks and their deltas
pub mod audio;
pub mod gameconfig;
pub mod input;
pub mod spritestore;
pub mod timers;
pub mod worldtime;
