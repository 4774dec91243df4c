//! Sprite table shared with the renderer.
//!
//! The core never touches textures. It only keeps, per sprite id, where the
//! image lives and its natural size; graphics components hold a
//! [`SpriteRef`] and the platform resolves it when presenting.

use std::path::PathBuf;
use std::sync::Arc;

use glam::Vec2;
use log::debug;
use rustc_hash::FxHashMap;

/// Cheap, clonable sprite identifier.
pub type SpriteRef = Arc<str>;

#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub id: SpriteRef,
    pub source: PathBuf,
    pub size: Vec2,
}

#[derive(Debug, Default)]
pub struct SpriteStore {
    map: FxHashMap<SpriteRef, Sprite>,
}

impl SpriteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a sprite and return its reference.
    pub fn create(&mut self, id: &str, source: impl Into<PathBuf>, size: Vec2) -> SpriteRef {
        let id: SpriteRef = Arc::from(id);
        let sprite = Sprite {
            id: id.clone(),
            source: source.into(),
            size,
        };
        if self.map.insert(id.clone(), sprite).is_some() {
            debug!("sprite '{}' replaced", id);
        }
        id
    }

    /// Reference to an existing sprite, `None` if unknown.
    pub fn retrieve(&self, id: &str) -> Option<SpriteRef> {
        self.map.get(id).map(|s| s.id.clone())
    }

    pub fn get(&self, id: &str) -> Option<&Sprite> {
        self.map.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Sprite> {
        self.map.remove(id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
