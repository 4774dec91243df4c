//! Input capability: a controller strategy reading the key snapshot.
//!
//! An [`InputComponent`] owns one boxed [`InputController`]. The controller
//! is handed the engine during its update, so it can read the keys, inspect
//! its entity and publish events. [`KeyboardController`] is the stock
//! strategy: it turns held direction keys into `DidPressDirection` events.

use std::fmt;

use bitflags::bitflags;
use log::debug;

use crate::components::Capability;
use crate::engine::Engine;
use crate::events::{DID_PRESS_DIRECTION, Sender};
use crate::resources::input::KeyStatus;
use crate::scene::EntityId;

/// Behaviour plugged into an [`InputComponent`].
pub trait InputController {
    /// Called once when the owning entity is initialized.
    fn init(&mut self, _entity: EntityId, _engine: &mut Engine) {}

    /// Clear transient state; the tree and subscriptions are kept.
    fn reset(&mut self) {}

    /// Called every tick, before the entity's animation update.
    fn update(&mut self, entity: EntityId, engine: &mut Engine);
}

/// Movement direction; the discriminant is the event parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn from_parameter(parameter: i32) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| *d as i32 == parameter)
    }

    fn held(self, keys: &KeyStatus) -> bool {
        match self {
            Direction::Up => keys.up,
            Direction::Down => keys.down,
            Direction::Left => keys.left,
            Direction::Right => keys.right,
        }
    }

    fn flag(self) -> DirectionSet {
        match self {
            Direction::Up => DirectionSet::UP,
            Direction::Down => DirectionSet::DOWN,
            Direction::Left => DirectionSet::LEFT,
            Direction::Right => DirectionSet::RIGHT,
        }
    }
}

bitflags! {
    /// Directions a controller reacts to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DirectionSet: u8 {
        const UP = 1 << 0;
        const DOWN = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
    }
}

/// Publishes `DidPressDirection` (parameter = [`Direction`]) for the first
/// allowed held direction, in `Up, Down, Left, Right` priority. Nothing is
/// published while the entity is animating, so a move started by a handler
/// runs to completion before the next one.
#[derive(Debug, Clone)]
pub struct KeyboardController {
    pub allowed: DirectionSet,
    last: Option<Direction>,
}

impl Default for KeyboardController {
    fn default() -> Self {
        Self::new(DirectionSet::all())
    }
}

impl KeyboardController {
    pub fn new(allowed: DirectionSet) -> Self {
        Self { allowed, last: None }
    }

    /// Direction published by the last update, if any.
    pub fn last_direction(&self) -> Option<Direction> {
        self.last
    }

    fn pick(&self, keys: &KeyStatus) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|d| self.allowed.contains(d.flag()) && d.held(keys))
    }
}

impl InputController for KeyboardController {
    fn reset(&mut self) {
        self.last = None;
    }

    fn update(&mut self, entity: EntityId, engine: &mut Engine) {
        self.last = None;
        let animating = engine
            .scene()
            .get(entity)
            .is_some_and(|e| e.is_animating());
        if animating {
            return;
        }
        if let Some(direction) = self.pick(engine.keys()) {
            debug!("entity {} pressed {:?}", entity, direction);
            self.last = Some(direction);
            engine.notify(
                &DID_PRESS_DIRECTION.with_parameter(direction as i32),
                Sender::Component(entity, Capability::Input),
            );
        }
    }
}

/// Input slot of an entity.
#[derive(Default)]
pub struct InputComponent {
    controller: Option<Box<dyn InputController>>,
    pub(super) owner: Option<EntityId>,
}

impl fmt::Debug for InputComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputComponent")
            .field("has_controller", &self.controller.is_some())
            .finish()
    }
}

impl InputComponent {
    pub fn new(controller: impl InputController + 'static) -> Self {
        Self {
            controller: Some(Box::new(controller)),
            owner: None,
        }
    }

    pub fn keyboard(allowed: DirectionSet) -> Self {
        Self::new(KeyboardController::new(allowed))
    }

    /// Move the controller out while it runs against the engine.
    pub(crate) fn take_controller(&mut self) -> Option<Box<dyn InputController>> {
        self.controller.take()
    }

    pub(crate) fn restore_controller(&mut self, controller: Box<dyn InputController>) {
        self.controller.get_or_insert(controller);
    }

    pub fn reset(&mut self) {
        if let Some(controller) = self.controller.as_mut() {
            controller.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_allowed_held_direction() {
        let controller = KeyboardController::new(DirectionSet::LEFT | DirectionSet::RIGHT);
        let keys = KeyStatus {
            up: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(controller.pick(&keys), Some(Direction::Right));
        assert_eq!(controller.pick(&KeyStatus::default()), None);
    }

    #[test]
    fn direction_round_trips_through_parameter() {
        for d in Direction::ALL {
            assert_eq!(Direction::from_parameter(d as i32), Some(d));
        }
        assert_eq!(Direction::from_parameter(9), None);
    }
}
