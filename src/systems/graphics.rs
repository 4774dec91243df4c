use crate::engine::Engine;
use crate::platform::DrawCommand;
use crate::scene::EntityId;

/// Queue the entity's current sprite for this frame, in world coordinates.
/// Entities without a sprite, or hidden ones, draw nothing.
pub fn update(engine: &mut Engine, entity: EntityId) {
    let scene = engine.scene();
    let Some(graphics) = scene.get(entity).and_then(|e| e.graphics()) else {
        return;
    };
    if graphics.hidden {
        return;
    }
    let Some(sprite) = graphics.current_sprite.clone() else {
        return;
    };
    let Some(position) = scene.world_position(entity) else {
        return;
    };
    let command = DrawCommand {
        entity,
        sprite,
        rect: graphics.bounds.aabb(position),
    };
    engine.push_draw(command);
}
