use crate::components::bounds::Bounds;
use crate::resources::spritestore::SpriteRef;
use crate::scene::EntityId;

/// What the renderer draws for an entity: the current sprite inside
/// `bounds`, placed relative to the entity's world position.
#[derive(Debug, Clone, Default)]
pub struct GraphicsComponent {
    pub current_sprite: Option<SpriteRef>,
    pub bounds: Bounds,
    /// Skip drawing without disabling the entity.
    pub hidden: bool,
    pub(super) owner: Option<EntityId>,
}

impl GraphicsComponent {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            current_sprite: None,
            bounds,
            hidden: false,
            owner: None,
        }
    }

    pub fn with_sprite(mut self, sprite: SpriteRef) -> Self {
        self.current_sprite = Some(sprite);
        self
    }

    pub fn set_sprite(&mut self, sprite: Option<SpriteRef>) {
        self.current_sprite = sprite;
    }
}
