//! Recursive lifecycle passes over the scene graph.
//!
//! - [`init_tree`]: the entity first, then its children.
//! - [`reset_tree`]: the entity's components first, then its children.
//! - [`update_tree`]: the entity's components in
//!   [`Capability::UPDATE_ORDER`], then its children in sibling order.
//!   Disabled entities are skipped together with their subtree.
//!
//! Handlers run synchronously during these passes and may add or destroy
//! entities. Child lists are snapshotted before recursing and every step
//! re-checks that its entity still exists.

use crate::components::{Capability, ComponentMask};
use crate::engine::Engine;
use crate::scene::EntityId;
use crate::systems::{animation, audio, graphics, input, physics};

pub fn init_tree(engine: &mut Engine, entity: EntityId) {
    if !engine.scene().contains(entity) {
        return;
    }
    input::init(engine, entity);
    for child in engine.scene().children(entity).to_vec() {
        init_tree(engine, child);
    }
}

pub fn reset_tree(engine: &mut Engine, entity: EntityId) {
    let Some(e) = engine.scene_mut().get_mut(entity) else {
        return;
    };
    if let Some(input) = e.input_mut() {
        input.reset();
    }
    if let Some(animation) = e.animation_mut() {
        animation.reset();
    }
    if let Some(physics) = e.physics_mut() {
        physics.reset();
    }
    audio::reset(engine, entity);
    for child in engine.scene().children(entity).to_vec() {
        reset_tree(engine, child);
    }
}

pub fn update_tree(engine: &mut Engine, entity: EntityId, mask: ComponentMask) {
    match engine.scene().get(entity) {
        Some(e) if e.enabled => {}
        _ => return,
    }
    for capability in Capability::UPDATE_ORDER {
        if !mask.contains(capability.mask()) {
            continue;
        }
        match engine.scene().get(entity) {
            Some(e) if e.has(capability) => {}
            Some(_) => continue,
            None => return,
        }
        match capability {
            Capability::Input => input::update(engine, entity),
            Capability::Animation => animation::update(engine, entity),
            Capability::Physics => physics::update(engine, entity),
            Capability::Audio => audio::update(engine, entity),
            Capability::Graphics => graphics::update(engine, entity),
        }
    }
    for child in engine.scene().children(entity).to_vec() {
        update_tree(engine, child, mask);
    }
}
