//! Event types and the synchronous event bus.
//!
//! Events are small named notifications with an optional integer payload.
//! They are published through the [`bus::EventBus`] owned by the
//! [`Engine`](crate::engine::Engine) and delivered synchronously to every
//! matching subscription.
//!
//! Submodules:
//! - [`audio`] – commands and messages exchanged with the audio callback
//! - [`bus`] – subscription registry and dispatch
//!
//! The engine itself publishes the `DID_*` events declared here.

pub mod audio;
pub mod bus;

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::components::Capability;
use crate::scene::EntityId;

/// A named notification.
///
/// Two events are equal when their names are equal; the parameter only
/// carries payload (for example a direction index).
#[derive(Debug, Clone)]
pub struct Event {
    name: Cow<'static, str>,
    parameter: Option<i32>,
}

impl Event {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            parameter: None,
        }
    }

    /// Build an event with a runtime name.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            parameter: None,
        }
    }

    /// Same event carrying `parameter` as payload.
    pub fn with_parameter(&self, parameter: i32) -> Self {
        Self {
            name: self.name.clone(),
            parameter: Some(parameter),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameter(&self) -> Option<i32> {
        self.parameter
    }

    pub(crate) fn key(&self) -> Cow<'static, str> {
        self.name.clone()
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Event {}

impl Hash for Event {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parameter {
            Some(p) => write!(f, "{}({})", self.name, p),
            None => f.write_str(&self.name),
        }
    }
}

impl From<&'static str> for Event {
    fn from(name: &'static str) -> Self {
        Event::new(name)
    }
}

/// Emitted by an animation component when a curve starts playing.
pub const DID_START_ANIMATING: Event = Event::new("DidStartAnimating");
/// Emitted by an animation component when a curve reaches its end.
pub const DID_STOP_ANIMATING: Event = Event::new("DidStopAnimating");
/// Emitted by a physics component once per tick with a non-empty collision list.
pub const DID_COLLIDE: Event = Event::new("DidCollide");
/// Emitted by a physics component when its bounds overlap the view again.
pub const DID_MOVE_INTO_VIEW: Event = Event::new("DidMoveIntoView");
/// Emitted by a physics component when its bounds fully leave the view.
pub const DID_MOVE_OUT_OF_VIEW: Event = Event::new("DidMoveOutOfView");
/// Emitted on behalf of an audio component when one of its sounds finished.
pub const DID_FINISH_SOUND: Event = Event::new("DidFinishSound");
/// Emitted by [`KeyboardController`](crate::components::input::KeyboardController);
/// the parameter is the [`Direction`](crate::components::input::Direction).
pub const DID_PRESS_DIRECTION: Event = Event::new("DidPressDirection");
/// Emitted by the engine when the effective clock is paused.
pub const DID_PAUSE: Event = Event::new("DidPause");
/// Emitted by the engine when the effective clock resumes.
pub const DID_RESUME: Event = Event::new("DidResume");
/// Emitted by the engine after the scene has been reset.
pub const DID_RESET: Event = Event::new("DidReset");

/// Who published an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    /// The engine root itself.
    Engine,
    /// An entity acting as a whole.
    Entity(EntityId),
    /// One component slot of an entity.
    Component(EntityId, Capability),
}

impl Sender {
    pub fn entity(&self) -> Option<EntityId> {
        match *self {
            Sender::Engine => None,
            Sender::Entity(id) | Sender::Component(id, _) => Some(id),
        }
    }

    pub fn capability(&self) -> Option<Capability> {
        match *self {
            Sender::Component(_, capability) => Some(capability),
            _ => None,
        }
    }
}
