//! Playback of animation curves against the effective clock.
//!
//! - [`perform_animation`] starts a curve on an entity.
//! - [`update`] moves an animating entity along its curve each tick and
//!   finishes the animation once its duration has elapsed.
//!
//! Elapsed time is always recomputed from the effective clock, so pausing
//! the engine freezes every animation in place.

use log::debug;

use crate::components::Capability;
use crate::engine::Engine;
use crate::events::{DID_START_ANIMATING, DID_STOP_ANIMATING, Sender};
use crate::scene::EntityId;

/// Start playing `curve_id` on `entity` for `duration` seconds, from the
/// entity's current local position.
///
/// Returns `false` without side effects if the entity is already animating,
/// has no animation component, or the curve is unknown or has fewer than two
/// points.
pub fn perform_animation(
    engine: &mut Engine,
    entity: EntityId,
    curve_id: &str,
    duration: f64,
    update_velocity_on_finish: bool,
) -> bool {
    let now = engine.time().effective();
    let Some(e) = engine.scene_mut().get_mut(entity) else {
        return false;
    };
    let origin = e.local_position;
    let Some(animation) = e.animation_mut() else {
        debug!("perform_animation: entity {} has no animation component", entity);
        return false;
    };
    if !animation.begin(curve_id, duration, now, origin, update_velocity_on_finish) {
        return false;
    }
    engine.notify(
        &DID_START_ANIMATING,
        Sender::Component(entity, Capability::Animation),
    );
    true
}

pub fn update(engine: &mut Engine, entity: EntityId) {
    let now = engine.time().effective();
    let Some(e) = engine.scene_mut().get_mut(entity) else {
        return;
    };
    let Some((position, finished)) = e.animation().and_then(|a| a.sample(now)) else {
        return;
    };
    e.local_position = position;
    if !finished {
        return;
    }
    let velocity = e.animation_mut().and_then(|animation| {
        let active = animation.finish()?;
        animation.finish_velocity(&active)
    });
    if let Some(velocity) = velocity {
        e.velocity = velocity;
    }
    engine.notify(
        &DID_STOP_ANIMATING,
        Sender::Component(entity, Capability::Animation),
    );
}
