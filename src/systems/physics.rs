//! Per-tick physics of one entity.
//!
//! Dynamic bodies integrate gravity and velocity, then are tested against
//! the static obstacles of their tree (see [`crate::systems::collision`]).
//! Every physics body, dynamic or not, is checked against the view
//! rectangle and reports boundary crossings once per edge.

use log::debug;

use crate::components::Capability;
use crate::engine::Engine;
use crate::events::{DID_COLLIDE, Sender};
use crate::scene::EntityId;
use crate::systems::collision::{
    collect_obstacles, overlaps_view, resolve_collisions, view_transition,
};
use crate::systems::movement::integrate;

pub fn update(engine: &mut Engine, entity: EntityId) {
    let delta = engine.time().delta();
    let view = engine.view().rect();
    let sender = Sender::Component(entity, Capability::Physics);

    let (physics, mut position, mut velocity, animating) = match engine.scene().get(entity) {
        Some(e) => match e.physics() {
            Some(p) => (p.clone(), e.local_position, e.velocity, e.is_animating()),
            None => return,
        },
        None => return,
    };

    let mut collided = None;
    if physics.dynamic {
        if !animating || physics.simulate_with_animations {
            position = integrate(position, &mut velocity, physics.gravity, delta);
        }
        if physics.collision_detection {
            let scene = engine.scene();
            let obstacles = collect_obstacles(scene, entity);
            let parent_world = scene.parent_world_position(entity);
            let resolution = resolve_collisions(
                &physics.bounds,
                parent_world,
                position,
                &mut velocity,
                &obstacles,
                physics.collision_response,
            );
            position = resolution.position;
            collided = Some(resolution.collided);
        }
    }

    let parent_world = engine.scene().parent_world_position(entity);
    let Some(e) = engine.scene_mut().get_mut(entity) else {
        return;
    };
    if physics.dynamic {
        e.local_position = position;
        e.velocity = velocity;
    }
    let rect = physics.bounds.aabb(parent_world + e.local_position);
    let Some(state) = e.physics_mut() else {
        return;
    };
    let hit_something = match collided {
        Some(list) => {
            let hit = !list.is_empty();
            state.set_collided(list);
            hit
        }
        None => false,
    };
    let was_out = state.is_out_of_view();
    let is_out = !overlaps_view(&rect, &view);
    state.set_out_of_view(is_out);

    if hit_something {
        debug!("entity {} collided", entity);
        engine.notify(&DID_COLLIDE, sender);
    }
    if let Some(event) = view_transition(was_out, is_out) {
        debug!("entity {}: {}", entity, event);
        engine.notify(&event, sender);
    }
}
