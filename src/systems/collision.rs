//! Broad-phase AABB collision against static obstacles, and the view
//! boundary check.
//!
//! A collider is tested at its tentative (post-integration) position against
//! the current bounds of every obstacle. Obstacles do not move during the
//! test, and every obstacle overlapping the tentative rectangle is reported.
//! With response enabled, the hits are then resolved in order: each one that
//! still overlaps the corrected rectangle pushes the collider out along the
//! axis of least penetration and zeroes its velocity on that axis.

use glam::Vec2;
use smallvec::SmallVec;

use crate::components::bounds::{Aabb, Bounds};
use crate::components::physics::CollisionList;
use crate::events::{DID_MOVE_INTO_VIEW, DID_MOVE_OUT_OF_VIEW, Event};
use crate::scene::{EntityId, Scene};

/// An obstacle resolved into world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub entity: EntityId,
    pub rect: Aabb,
}

/// Every active entity in the tree of `collider` whose physics takes part in
/// collision detection, except `collider` itself, in pre-order.
pub fn collect_obstacles(scene: &Scene, collider: EntityId) -> Vec<Obstacle> {
    let root = scene.root_of(collider);
    scene
        .descendants(root)
        .into_iter()
        .filter(|id| *id != collider && scene.is_active(*id))
        .filter_map(|id| {
            let physics = scene.get(id)?.physics()?;
            if !physics.collision_detection {
                return None;
            }
            let position = scene.world_position(id)?;
            Some(Obstacle {
                entity: id,
                rect: physics.bounds.aabb(position),
            })
        })
        .collect()
}

/// Outcome of [`resolve_collisions`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Local position after any response.
    pub position: Vec2,
    pub collided: CollisionList,
}

/// Test `bounds` placed at `parent_world + position` against `obstacles`.
///
/// `velocity` is only touched when `response` is set.
pub fn resolve_collisions(
    bounds: &Bounds,
    parent_world: Vec2,
    position: Vec2,
    velocity: &mut Vec2,
    obstacles: &[Obstacle],
    response: bool,
) -> Resolution {
    let tentative = bounds.aabb(parent_world + position);
    let hits: SmallVec<[&Obstacle; 4]> = obstacles
        .iter()
        .filter(|obstacle| tentative.intersects(&obstacle.rect))
        .collect();
    let collided: CollisionList = hits.iter().map(|obstacle| obstacle.entity).collect();

    let mut position = position;
    if response {
        for obstacle in hits {
            let rect = bounds.aabb(parent_world + position);
            if !rect.intersects(&obstacle.rect) {
                continue;
            }
            let depth = rect.penetration(&obstacle.rect);
            let ours = rect.center();
            let theirs = obstacle.rect.center();
            if depth.x < depth.y {
                velocity.x = 0.0;
                position.x += if ours.x < theirs.x { -depth.x } else { depth.x };
            } else {
                velocity.y = 0.0;
                position.y += if ours.y < theirs.y { -depth.y } else { depth.y };
            }
        }
    }
    Resolution { position, collided }
}

/// Whether `rect` is at least partly inside `view`. Degenerate rectangles
/// count as a point.
pub fn overlaps_view(rect: &Aabb, view: &Aabb) -> bool {
    let size = rect.size();
    if size.x <= 0.0 || size.y <= 0.0 {
        view.contains_point(rect.min)
    } else {
        rect.intersects(view)
    }
}

/// Event for a view boundary crossing, given the previous and current
/// out-of-view state.
pub fn view_transition(was_out: bool, is_out: bool) -> Option<Event> {
    match (was_out, is_out) {
        (false, true) => Some(DID_MOVE_OUT_OF_VIEW),
        (true, false) => Some(DID_MOVE_INTO_VIEW),
        _ => None,
    }
}
