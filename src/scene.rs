//! Scene graph: the tree of simulated entities.
//!
//! Entities live in an arena owned by [`Scene`] and are addressed by
//! [`EntityId`] (slot index + generation, so ids of destroyed entities never
//! alias new ones). Each entity owns its children (as ids into the same
//! arena), at most one component per [`Capability`], and the scoped event
//! subscriptions registered on its behalf.
//!
//! Sibling order is keyed by [`Entity::order`]: children are kept sorted by
//! order (stable, so equal keys keep insertion order) and the update/draw
//! traversal follows that order.
//!
//! Lifecycle passes that need the engine (`init`, `reset`, `update`) are
//! driven by [`Engine`](crate::engine::Engine); this module only owns the
//! structure.

use std::fmt;

use glam::Vec2;
use log::{debug, warn};

use crate::components::{Capability, Component};
use crate::components::animation::AnimationComponent;
use crate::components::audio::AudioComponent;
use crate::components::graphics::GraphicsComponent;
use crate::components::input::InputComponent;
use crate::components::physics::PhysicsComponent;
use crate::events::bus::Subscription;

/// Arena handle of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Pack into a single integer (generation in the high bits).
    pub fn to_bits(&self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }

    pub fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// A node of the scene graph.
pub struct Entity {
    /// Set when the entity is inserted into a scene.
    id: Option<EntityId>,
    name: String,
    order: i32,
    /// Disabled entities (and their subtrees) are skipped by updates and are
    /// not collision obstacles.
    pub enabled: bool,
    pub local_position: Vec2,
    pub velocity: Vec2,
    parent: Option<EntityId>,
    children: Vec<EntityId>,
    input: Option<InputComponent>,
    animation: Option<AnimationComponent>,
    physics: Option<PhysicsComponent>,
    audio: Option<AudioComponent>,
    graphics: Option<GraphicsComponent>,
    subscriptions: Vec<Subscription>,
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("order", &self.order)
            .field("enabled", &self.enabled)
            .field("local_position", &self.local_position)
            .field("velocity", &self.velocity)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("capabilities", &self.capabilities())
            .finish()
    }
}

macro_rules! component_slot {
    ($field:ident, $field_mut:ident, $setter:ident, $builder:ident, $ty:ty, $cap:expr) => {
        pub fn $field(&self) -> Option<&$ty> {
            self.$field.as_ref()
        }

        pub fn $field_mut(&mut self) -> Option<&mut $ty> {
            self.$field.as_mut()
        }

        /// Attach the component. The slot can only be filled once; a second
        /// assignment is ignored and returns `false`.
        pub fn $setter(&mut self, mut component: $ty) -> bool {
            if self.$field.is_some() {
                warn!(
                    "entity '{}' already has a {} component; ignoring",
                    self.name,
                    $cap.name()
                );
                return false;
            }
            if let Some(id) = self.id {
                component.bind(id);
            }
            self.$field = Some(component);
            true
        }

        /// Builder form of the setter.
        pub fn $builder(mut self, component: $ty) -> Self {
            self.$setter(component);
            self
        }
    };
}

impl Entity {
    pub fn new(name: impl Into<String>, order: i32) -> Self {
        Self {
            id: None,
            name: name.into(),
            order,
            enabled: true,
            local_position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            parent: None,
            children: Vec::new(),
            input: None,
            animation: None,
            physics: None,
            audio: None,
            graphics: None,
            subscriptions: Vec::new(),
        }
    }

    /// Arena id, once the entity is in a scene.
    pub fn id(&self) -> Option<EntityId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sibling order key. Change it through [`Scene::set_order`] so the
    /// parent's child list is re-sorted.
    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    component_slot!(input, input_mut, set_input, with_input, InputComponent, Capability::Input);
    component_slot!(
        animation,
        animation_mut,
        set_animation,
        with_animation,
        AnimationComponent,
        Capability::Animation
    );
    component_slot!(
        physics,
        physics_mut,
        set_physics,
        with_physics,
        PhysicsComponent,
        Capability::Physics
    );
    component_slot!(audio, audio_mut, set_audio, with_audio, AudioComponent, Capability::Audio);
    component_slot!(
        graphics,
        graphics_mut,
        set_graphics,
        with_graphics,
        GraphicsComponent,
        Capability::Graphics
    );

    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Input => self.input.is_some(),
            Capability::Animation => self.animation.is_some(),
            Capability::Physics => self.physics.is_some(),
            Capability::Audio => self.audio.is_some(),
            Capability::Graphics => self.graphics.is_some(),
        }
    }

    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::UPDATE_ORDER
            .into_iter()
            .filter(|c| self.has(*c))
            .collect()
    }

    /// Record `id` on the entity and on every attached component.
    fn bind(&mut self, id: EntityId) {
        self.id = Some(id);
        if let Some(input) = self.input.as_mut() {
            input.bind(id);
        }
        if let Some(animation) = self.animation.as_mut() {
            animation.bind(id);
        }
        if let Some(physics) = self.physics.as_mut() {
            physics.bind(id);
        }
        if let Some(audio) = self.audio.as_mut() {
            audio.bind(id);
        }
        if let Some(graphics) = self.graphics.as_mut() {
            graphics.bind(id);
        }
    }

    /// Keep a scoped subscription alive for as long as this entity exists.
    pub fn hold(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.as_ref().is_some_and(|a| a.animating())
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.move_to(x, y);
        self
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.local_position = Vec2::new(x, y);
    }

    pub fn move_horizontally_to(&mut self, x: f32) {
        self.local_position.x = x;
    }

    pub fn move_vertically_to(&mut self, y: f32) {
        self.local_position.y = y;
    }

    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.local_position += Vec2::new(dx, dy);
    }

    pub fn change_velocity_to(&mut self, vx: f32, vy: f32) {
        self.velocity = Vec2::new(vx, vy);
    }

    pub fn change_horizontal_velocity_to(&mut self, vx: f32) {
        self.velocity.x = vx;
    }

    pub fn change_vertical_velocity_to(&mut self, vy: f32) {
        self.velocity.y = vy;
    }

    pub fn change_velocity_by(&mut self, dvx: f32, dvy: f32) {
        self.velocity += Vec2::new(dvx, dvy);
    }
}

struct Slot {
    generation: u32,
    entity: Option<Entity>,
}

/// Arena owning every entity of the simulation.
#[derive(Default)]
pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("entities", &self.live)
            .field("slots", &self.slots.len())
            .finish()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Insert a parentless entity (a scene root).
    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        entity.parent = None;
        entity.children.clear();
        self.insert(entity)
    }

    /// Insert `child` under `parent`, after every sibling whose order is less
    /// than or equal to the child's. Returns `None` if `parent` is gone.
    pub fn add_child(&mut self, parent: EntityId, mut child: Entity) -> Option<EntityId> {
        if !self.contains(parent) {
            warn!("add_child: parent {} does not exist", parent);
            return None;
        }
        child.parent = Some(parent);
        child.children.clear();
        let order = child.order;
        let id = self.insert(child);

        let position = {
            let siblings = self.children(parent);
            siblings.partition_point(|s| self.get(*s).is_some_and(|e| e.order <= order))
        };
        if let Some(parent) = self.get_mut(parent) {
            parent.children.insert(position, id);
        }
        Some(id)
    }

    /// First direct child of `parent` whose name equals `name`.
    pub fn find_child(&self, parent: EntityId, name: &str) -> Option<EntityId> {
        let found = self
            .children(parent)
            .iter()
            .copied()
            .find(|c| self.get(*c).is_some_and(|e| e.name == name));
        if found.is_none() {
            debug!("find_child: no child '{}' under {}", name, parent);
        }
        found
    }

    /// Depth-first search below `root` (root excluded) for `name`.
    pub fn find_descendant(&self, root: EntityId, name: &str) -> Option<EntityId> {
        self.descendants(root)
            .into_iter()
            .skip(1)
            .find(|id| self.get(*id).is_some_and(|e| e.name == name))
    }

    /// Destroy the child named `name` of `parent` and its whole subtree.
    pub fn remove_child(&mut self, parent: EntityId, name: &str) -> bool {
        match self.find_child(parent, name) {
            Some(child) => self.destroy(child),
            None => false,
        }
    }

    /// Destroy `id`: children first (recursively), then the entity with its
    /// components and subscriptions. Detaches it from its parent.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.get(id) else {
            return false;
        };
        let parent = entity.parent;
        let children = entity.children.clone();
        for child in children {
            self.destroy(child);
        }
        if let Some(parent) = parent.and_then(|p| self.get_mut(p)) {
            parent.children.retain(|c| *c != id);
        }
        let slot = &mut self.slots[id.index as usize];
        if let Some(entity) = slot.entity.take() {
            debug!("destroyed entity '{}' ({})", entity.name, id);
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
            self.live -= 1;
            // Components drop first, then the subscriptions they relied on.
            let Entity {
                input,
                animation,
                physics,
                audio,
                graphics,
                subscriptions,
                ..
            } = entity;
            drop((input, animation, physics, audio, graphics));
            drop(subscriptions);
        }
        true
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entity.as_ref())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entity.as_mut())
    }

    /// Children of `id` in sibling order (empty if `id` is gone).
    pub fn children(&self, id: EntityId) -> &[EntityId] {
        self.get(id).map_or(&[], |e| e.children.as_slice())
    }

    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.get(id).and_then(|e| e.parent)
    }

    /// Topmost ancestor of `id` (itself when parentless).
    pub fn root_of(&self, id: EntityId) -> EntityId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Change the sibling order key of `id` and re-sort its parent's children.
    ///
    /// Precondition: must not be called from inside the entity's own reset
    /// pass; the sibling order observed by the in-progress traversal is then
    /// undefined.
    pub fn set_order(&mut self, id: EntityId, order: i32) -> bool {
        let Some(entity) = self.get_mut(id) else {
            return false;
        };
        entity.order = order;
        let Some(parent) = entity.parent else {
            return true;
        };
        let mut keyed: Vec<(i32, EntityId)> = self
            .children(parent)
            .iter()
            .map(|c| (self.get(*c).map_or(i32::MAX, |e| e.order), *c))
            .collect();
        keyed.sort_by_key(|(order, _)| *order);
        if let Some(parent) = self.get_mut(parent) {
            parent.children = keyed.into_iter().map(|(_, c)| c).collect();
        }
        true
    }

    /// Sum of local positions from `id` up to its root.
    pub fn world_position(&self, id: EntityId) -> Option<Vec2> {
        let mut entity = self.get(id)?;
        let mut position = entity.local_position;
        while let Some(parent) = entity.parent.and_then(|p| self.get(p)) {
            position += parent.local_position;
            entity = parent;
        }
        Some(position)
    }

    /// World position of the parent of `id` (zero for roots).
    pub fn parent_world_position(&self, id: EntityId) -> Vec2 {
        self.parent(id)
            .and_then(|p| self.world_position(p))
            .unwrap_or(Vec2::ZERO)
    }

    /// Whether `id` and every ancestor are enabled.
    pub fn is_active(&self, id: EntityId) -> bool {
        let mut current = Some(id);
        while let Some(cid) = current {
            match self.get(cid) {
                Some(e) if e.enabled => current = e.parent,
                _ => return false,
            }
        }
        true
    }

    /// Pre-order walk of the subtree at `root` in sibling order, root first.
    pub fn descendants(&self, root: EntityId) -> Vec<EntityId> {
        let mut out = Vec::new();
        if !self.contains(root) {
            return out;
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.entity.as_ref().map(|e| {
                (
                    EntityId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    e,
                )
            })
        })
    }

    fn insert(&mut self, mut entity: Entity) -> EntityId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            let id = EntityId {
                index,
                generation: slot.generation,
            };
            entity.bind(id);
            slot.entity = Some(entity);
            id
        } else {
            let id = EntityId {
                index: self.slots.len() as u32,
                generation: 0,
            };
            entity.bind(id);
            self.slots.push(Slot {
                generation: 0,
                entity: Some(entity),
            });
            id
        }
    }
}
