//! Capability components attached to scene entities.
//!
//! Every [`Entity`](crate::scene::Entity) owns at most one component per
//! [`Capability`]. Components are plain state records; the per-tick behaviour
//! that needs the whole engine (events, clocks, other entities) lives in
//! [`crate::systems`].
//!
//! Submodules overview:
//! - [`animation`] – named cubic-Hermite curves and the active playback state
//! - [`audio`] – queue of sounds triggered by the entity this tick
//! - [`bounds`] – offset/size rectangles and world-space AABBs
//! - [`graphics`] – current sprite reference and draw bounds for the renderer
//! - [`input`] – controller strategy reading the key snapshot
//! - [`physics`] – gravity, collision flags and per-tick collision results

pub mod animation;
pub mod audio;
pub mod bounds;
pub mod graphics;
pub mod input;
pub mod physics;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::events::Sender;
use crate::scene::EntityId;

/// The five component slots of an entity, in per-tick update order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Capability {
    Input,
    Animation,
    Physics,
    Audio,
    Graphics,
}

impl Capability {
    /// All capabilities in the order the scene traversal updates them.
    pub const UPDATE_ORDER: [Capability; 5] = [
        Capability::Input,
        Capability::Animation,
        Capability::Physics,
        Capability::Audio,
        Capability::Graphics,
    ];

    /// The mask bit selecting this capability.
    pub fn mask(self) -> ComponentMask {
        match self {
            Capability::Input => ComponentMask::INPUT,
            Capability::Animation => ComponentMask::ANIMATION,
            Capability::Physics => ComponentMask::PHYSICS,
            Capability::Audio => ComponentMask::AUDIO,
            Capability::Graphics => ComponentMask::GRAPHICS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Capability::Input => "input",
            Capability::Animation => "animation",
            Capability::Physics => "physics",
            Capability::Audio => "audio",
            Capability::Graphics => "graphics",
        }
    }
}

/// Shared surface of the component kinds.
///
/// A component knows the entity that owns it once that entity is in a
/// [`Scene`](crate::scene::Scene). The reference is a plain id and does not
/// keep the entity alive.
pub trait Component {
    const CAPABILITY: Capability;

    fn owner(&self) -> Option<EntityId>;

    fn bind(&mut self, owner: EntityId);

    /// Identity used when this component publishes an event.
    fn sender(&self) -> Option<Sender> {
        self.owner().map(|owner| Sender::Component(owner, Self::CAPABILITY))
    }
}

macro_rules! impl_component {
    ($ty:ty, $cap:expr) => {
        impl Component for $ty {
            const CAPABILITY: Capability = $cap;

            fn owner(&self) -> Option<EntityId> {
                self.owner
            }

            fn bind(&mut self, owner: EntityId) {
                self.owner = Some(owner);
            }
        }
    };
}

impl_component!(input::InputComponent, Capability::Input);
impl_component!(animation::AnimationComponent, Capability::Animation);
impl_component!(physics::PhysicsComponent, Capability::Physics);
impl_component!(audio::AudioComponent, Capability::Audio);
impl_component!(graphics::GraphicsComponent, Capability::Graphics);

bitflags! {
    /// Selects which component slots an update pass visits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ComponentMask: u8 {
        const INPUT = 1 << 0;
        const ANIMATION = 1 << 1;
        const PHYSICS = 1 << 2;
        const AUDIO = 1 << 3;
        const GRAPHICS = 1 << 4;
        /// Everything except graphics.
        const SIMULATION = Self::INPUT.bits()
            | Self::ANIMATION.bits()
            | Self::PHYSICS.bits()
            | Self::AUDIO.bits();
    }
}

impl Default for ComponentMask {
    fn default() -> Self {
        ComponentMask::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_order_matches_mask_bits() {
        let mut combined = ComponentMask::empty();
        for capability in Capability::UPDATE_ORDER {
            assert!(!combined.contains(capability.mask()));
            combined |= capability.mask();
        }
        assert_eq!(combined, ComponentMask::all());
    }

    #[test]
    fn bound_component_reports_its_owner_as_sender() {
        let mut audio = audio::AudioComponent::new();
        assert_eq!(audio.owner(), None);
        assert_eq!(audio.sender(), None);
        let owner = EntityId::from_bits(3);
        audio.bind(owner);
        assert_eq!(audio.owner(), Some(owner));
        assert_eq!(audio.sender(), Some(Sender::Component(owner, Capability::Audio)));
    }

    #[test]
    fn simulation_mask_excludes_graphics() {
        assert!(!ComponentMask::SIMULATION.contains(ComponentMask::GRAPHICS));
        assert!(ComponentMask::SIMULATION.contains(ComponentMask::PHYSICS));
    }
}
