//! Kinematic body with AABB collision against static obstacles.
//!
//! The [`PhysicsComponent`] stores the collision [`Bounds`], gravity and the
//! behaviour flags. Per-tick results (the entities collided with and the
//! view-boundary edge state) are written by
//! [`crate::systems::physics`] and cleared on reset.

use glam::Vec2;
use smallvec::SmallVec;

use crate::components::bounds::Bounds;
use crate::resources::gameconfig::EngineConfig;
use crate::scene::EntityId;

/// Entities hit during one tick. Rarely more than a handful.
pub type CollisionList = SmallVec<[EntityId; 4]>;

#[derive(Debug, Clone)]
pub struct PhysicsComponent {
    /// Collision rectangle relative to the entity.
    pub bounds: Bounds,
    /// Acceleration in world units per second squared.
    pub gravity: Vec2,
    /// Only dynamic bodies integrate and test for collisions.
    pub dynamic: bool,
    /// Take part in collision tests, as a collider and as an obstacle.
    pub collision_detection: bool,
    /// Stop at obstacles instead of passing through them.
    pub collision_response: bool,
    /// Keep integrating while an animation drives the entity.
    pub simulate_with_animations: bool,
    collided: CollisionList,
    out_of_view: bool,
    pub(super) owner: Option<EntityId>,
}

impl Default for PhysicsComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsComponent {
    /// A static, collidable body with empty bounds.
    pub fn new() -> Self {
        Self {
            bounds: Bounds::default(),
            gravity: Vec2::ZERO,
            dynamic: false,
            collision_detection: true,
            collision_response: false,
            simulate_with_animations: false,
            collided: CollisionList::new(),
            out_of_view: false,
            owner: None,
        }
    }

    /// A body using the configured default gravity.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new().with_gravity(0.0, config.gravity_y)
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_gravity(mut self, x: f32, y: f32) -> Self {
        self.gravity = Vec2::new(x, y);
        self
    }

    pub fn dynamic(mut self) -> Self {
        self.dynamic = true;
        self
    }

    pub fn with_collision_response(mut self, enabled: bool) -> Self {
        self.collision_response = enabled;
        self
    }

    pub fn with_collision_detection(mut self, enabled: bool) -> Self {
        self.collision_detection = enabled;
        self
    }

    pub fn with_simulate_with_animations(mut self, enabled: bool) -> Self {
        self.simulate_with_animations = enabled;
        self
    }

    /// Entities collided with during the last tick.
    pub fn collided_entities(&self) -> &[EntityId] {
        &self.collided
    }

    pub(crate) fn set_collided(&mut self, collided: CollisionList) {
        self.collided = collided;
    }

    /// Whether the bounds were fully outside the view at the last check.
    pub fn is_out_of_view(&self) -> bool {
        self.out_of_view
    }

    /// Record the view state; returns `true` when it changed.
    pub(crate) fn set_out_of_view(&mut self, out: bool) -> bool {
        let changed = self.out_of_view != out;
        self.out_of_view = out;
        changed
    }

    pub fn reset(&mut self) {
        self.collided.clear();
        self.out_of_view = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_transient_state() {
        let mut physics = PhysicsComponent::new().dynamic();
        let mut hits = CollisionList::new();
        hits.push(EntityId::from_bits(7));
        physics.set_collided(hits);
        assert!(physics.set_out_of_view(true));
        assert!(!physics.set_out_of_view(true));

        physics.reset();
        assert!(physics.collided_entities().is_empty());
        assert!(!physics.is_out_of_view());
        assert!(physics.dynamic);
    }

    #[test]
    fn config_supplies_default_gravity() {
        let config = EngineConfig {
            gravity_y: 300.0,
            ..EngineConfig::new()
        };
        let physics = PhysicsComponent::from_config(&config);
        assert_eq!(physics.gravity, Vec2::new(0.0, 300.0));
        assert!(!physics.dynamic);
    }
}
