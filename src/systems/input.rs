//! Runs input controllers against the engine.
//!
//! The controller is moved out of its component while it runs, so it can
//! borrow the whole engine, and put back afterwards. If the entity was
//! destroyed by a handler in the meantime the controller is dropped.

use crate::components::input::InputController;
use crate::engine::Engine;
use crate::scene::EntityId;

pub fn init(engine: &mut Engine, entity: EntityId) {
    with_controller(engine, entity, |controller, engine| {
        controller.init(entity, engine)
    });
}

pub fn update(engine: &mut Engine, entity: EntityId) {
    with_controller(engine, entity, |controller, engine| {
        controller.update(entity, engine)
    });
}

fn with_controller(
    engine: &mut Engine,
    entity: EntityId,
    run: impl FnOnce(&mut dyn InputController, &mut Engine),
) {
    let Some(mut controller) = engine
        .scene_mut()
        .get_mut(entity)
        .and_then(|e| e.input_mut())
        .and_then(|input| input.take_controller())
    else {
        return;
    };
    run(controller.as_mut(), engine);
    if let Some(input) = engine.scene_mut().get_mut(entity).and_then(|e| e.input_mut()) {
        input.restore_controller(controller);
    }
}
