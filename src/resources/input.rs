//! Per-frame key snapshot.
//!
//! The platform fills a [`KeyStatus`] once per tick through
//! [`Platform::poll_input`](crate::platform::Platform::poll_input); input
//! controllers read it from the engine.
use serde::{Deserialize, Serialize};

/// The keys the engine cares about, `true` while held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStatus {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

impl KeyStatus {
    pub fn any_direction(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    pub fn clear(&mut self) {
        *self = KeyStatus::default();
    }
}
