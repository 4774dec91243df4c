//! The simulation root.
//!
//! [`Engine`] owns the scene graph, the event bus, both clocks and the timer
//! scheduler, the asset tables and the platform. A game drives it with:
//!
//! 1. build the tree in [`Engine::scene_mut`] and register assets,
//! 2. [`Engine::init`] once (returns `false` if the platform failed),
//! 3. call [`Engine::update`] once per frame until it returns `false`,
//! 4. [`Engine::destroy`] once.
//!
//! Every [`Engine::update`] advances the clocks from the platform's wall
//! time, polls the keys, fires due timers, publishes finished sounds, walks
//! the scene graph and presents the collected draw list. Handlers registered
//! on the bus receive `&mut Engine` and run synchronously within the tick.

use std::fmt;

use log::{error, info, warn};

use crate::components::ComponentMask;
use crate::events::bus::{EventBus, Subscription, SubscriptionToken};
use crate::events::{DID_PAUSE, DID_RESET, DID_RESUME, Event, Sender};
use crate::platform::{Dimension, DrawCommand, Platform, Rgba};
use crate::resources::audio::{AudioBridge, setup_audio};
use crate::resources::gameconfig::EngineConfig;
use crate::resources::input::KeyStatus;
use crate::resources::spritestore::SpriteStore;
use crate::resources::timers::{DueTimer, TimerScheduler};
use crate::resources::worldtime::WorldTime;
use crate::scene::{Entity, EntityId, Scene};
use crate::synth::Synthesizer;
use crate::systems;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Built, `init` not called yet.
    Created,
    Running,
    /// `update` reported shutdown; `destroy` is next.
    Stopping,
    Destroyed,
}

pub struct Engine {
    scene: Scene,
    bus: EventBus<Engine>,
    time: WorldTime,
    timers: TimerScheduler<Engine>,
    keys: KeyStatus,
    config: EngineConfig,
    sprites: SpriteStore,
    synthesizer: Synthesizer,
    audio: Option<AudioBridge>,
    draw_list: Vec<DrawCommand>,
    platform: Box<dyn Platform>,
    view: Dimension,
    root: Option<EntityId>,
    state: EngineState,
    clock_started: bool,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("root", &self.root)
            .field("scene", &self.scene)
            .field("time", &self.time)
            .field("timers", &self.timers)
            .finish()
    }
}

impl Engine {
    pub fn new(platform: impl Platform + 'static, config: EngineConfig) -> Self {
        let view = Dimension::new(config.view_width, config.view_height);
        Self {
            scene: Scene::new(),
            bus: EventBus::new(),
            time: WorldTime::new(),
            timers: TimerScheduler::new(),
            keys: KeyStatus::default(),
            config,
            sprites: SpriteStore::new(),
            synthesizer: Synthesizer::new(),
            audio: None,
            draw_list: Vec::new(),
            platform: Box::new(platform),
            view,
            root: None,
            state: EngineState::Created,
            clock_started: false,
        }
    }

    /// Open the platform, start audio and initialize the tree at `root`.
    ///
    /// Returns `false` on any platform failure. Nothing acquired so far is
    /// released in that case and `destroy` must not be called.
    pub fn init(
        &mut self,
        root: EntityId,
        title: &str,
        dimensions: Dimension,
        background: Rgba,
    ) -> bool {
        if self.state != EngineState::Created {
            warn!("init called twice");
            return false;
        }
        if !self.scene.contains(root) {
            error!("init: root entity {} does not exist", root);
            return false;
        }
        if let Err(e) = self
            .platform
            .open(title, dimensions, self.config.view_scale, background)
        {
            error!("Failed to initialize platform: {}", e);
            return false;
        }
        let (bridge, mixer) = setup_audio(self.config.sample_rate);
        if let Err(e) = self.platform.start_audio(mixer, &self.config) {
            error!("Failed to initialize audio: {}", e);
            return false;
        }
        self.audio = Some(bridge);
        self.view = dimensions;
        self.root = Some(root);
        self.state = EngineState::Running;
        systems::scene::init_tree(self, root);
        info!(
            "Engine '{}' running ({}x{}, {} entities)",
            title,
            dimensions.width,
            dimensions.height,
            self.scene.len()
        );
        true
    }

    /// Advance one frame. Returns `false` once the platform asked to quit
    /// (and on every call after that).
    pub fn update(&mut self) -> bool {
        if self.state != EngineState::Running {
            return false;
        }
        let now = self.platform.elapsed_seconds();
        systems::time::update_world_time(self, now);
        if !self.clock_started {
            self.clock_started = true;
            return true;
        }

        if self.platform.poll_input(&mut self.keys) {
            info!("Quit requested");
            self.state = EngineState::Stopping;
            return false;
        }

        systems::time::fire_timers(self);
        systems::audio::forward_finished(self);
        if let Some(root) = self.root {
            systems::scene::update_tree(self, root, ComponentMask::all());
        }

        let commands = std::mem::take(&mut self.draw_list);
        self.platform.present(&commands, &self.sprites);
        self.draw_list = commands;
        self.draw_list.clear();
        true
    }

    /// Tear everything down: audio, scene, subscriptions, timers, platform.
    pub fn destroy(&mut self) {
        if self.state == EngineState::Destroyed {
            warn!("destroy called twice");
            return;
        }
        if let Some(bridge) = self.audio.take() {
            bridge.shutdown();
        }
        if let Some(root) = self.root.take() {
            self.scene.destroy(root);
        }
        self.timers.clear();
        self.bus.clear();
        self.platform.close();
        self.state = EngineState::Destroyed;
        info!("Engine destroyed after {} frames", self.time.frame_count());
    }

    /// Reset transient state of the whole tree (components first, then
    /// children) and publish `DidReset`.
    pub fn reset(&mut self) {
        if let Some(root) = self.root {
            systems::scene::reset_tree(self, root);
        }
        self.notify(&DID_RESET, Sender::Engine);
    }

    /// Pause now, then after `delay` seconds of wall time reset the scene and
    /// resume.
    pub fn reset_after(&mut self, delay: f64) {
        self.pause();
        self.create_accumulative_timer(delay, |engine| {
            engine.reset();
            engine.resume();
        });
    }

    /// Freeze the effective clock. Publishes `DidPause` when it was running.
    pub fn pause(&mut self) -> bool {
        if !self.time.pause() {
            return false;
        }
        self.notify(&DID_PAUSE, Sender::Engine);
        true
    }

    /// Unfreeze the effective clock. Publishes `DidResume` when it was paused.
    pub fn resume(&mut self) -> bool {
        if !self.time.resume() {
            return false;
        }
        self.notify(&DID_RESUME, Sender::Engine);
        true
    }

    pub fn is_paused(&self) -> bool {
        self.time.is_paused()
    }

    /// Publish `event` synchronously to every matching subscription.
    pub fn notify(&mut self, event: &Event, sender: Sender) {
        let bus = self.bus.clone();
        bus.notify(self, event, sender);
    }

    pub fn observe<F>(
        &self,
        callback: F,
        event: &Event,
        filter: Option<Sender>,
    ) -> SubscriptionToken
    where
        F: FnMut(&Event, Sender, &mut Engine) + 'static,
    {
        self.bus.observe(callback, event, filter)
    }

    pub fn subscribe<F>(&self, callback: F, event: &Event, filter: Option<Sender>) -> Subscription
    where
        F: FnMut(&Event, Sender, &mut Engine) + 'static,
    {
        self.bus.subscribe(callback, event, filter)
    }

    /// Subscribe on behalf of `owner`; the subscription is dropped together
    /// with the entity. Returns `false` if `owner` does not exist.
    pub fn subscribe_for<F>(
        &mut self,
        owner: EntityId,
        callback: F,
        event: &Event,
        filter: Option<Sender>,
    ) -> bool
    where
        F: FnMut(&Event, Sender, &mut Engine) + 'static,
    {
        if !self.scene.contains(owner) {
            warn!("subscribe_for: entity {} does not exist", owner);
            return false;
        }
        let subscription = self.bus.subscribe(callback, event, filter);
        if let Some(entity) = self.scene.get_mut(owner) {
            entity.hold(subscription);
        }
        true
    }

    pub fn unobserve(
        &self,
        token: SubscriptionToken,
        event: &Event,
        filter: Option<Sender>,
    ) -> bool {
        self.bus.unobserve(token, event, filter)
    }

    pub fn bus(&self) -> &EventBus<Engine> {
        &self.bus
    }

    pub fn create_effective_timer(
        &mut self,
        duration: f64,
        callback: impl FnOnce(&mut Engine) + 'static,
    ) -> u64 {
        self.timers
            .create_effective_timer(&self.time, duration, callback)
    }

    pub fn create_accumulative_timer(
        &mut self,
        duration: f64,
        callback: impl FnOnce(&mut Engine) + 'static,
    ) -> u64 {
        self.timers
            .create_accumulative_timer(&self.time, duration, callback)
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    /// Start `curve_id` on `entity`. See
    /// [`systems::animation::perform_animation`].
    pub fn perform_animation(
        &mut self,
        entity: EntityId,
        curve_id: &str,
        duration: f64,
        update_velocity_on_finish: bool,
    ) -> bool {
        systems::animation::perform_animation(
            self,
            entity,
            curve_id,
            duration,
            update_velocity_on_finish,
        )
    }

    /// Add `child` under `parent`. Once the engine runs, the new subtree is
    /// initialized immediately.
    pub fn add_child(&mut self, parent: EntityId, child: Entity) -> Option<EntityId> {
        let id = self.scene.add_child(parent, child)?;
        if self.state == EngineState::Running {
            systems::scene::init_tree(self, id);
        }
        Some(id)
    }

    /// Destroy the child named `name` of `parent`, with its subtree.
    pub fn remove_child(&mut self, parent: EntityId, name: &str) -> bool {
        self.scene.remove_child(parent, name)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn root(&self) -> Option<EntityId> {
        self.root
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn time(&self) -> &WorldTime {
        &self.time
    }

    pub(crate) fn time_mut(&mut self) -> &mut WorldTime {
        &mut self.time
    }

    pub(crate) fn take_due_timers(&mut self) -> Vec<DueTimer<Engine>> {
        self.timers.take_due(&self.time)
    }

    pub fn keys(&self) -> &KeyStatus {
        &self.keys
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// View size in world units (the platform dimensions once initialized).
    pub fn view(&self) -> Dimension {
        self.view
    }

    pub fn sprites(&self) -> &SpriteStore {
        &self.sprites
    }

    pub fn sprites_mut(&mut self) -> &mut SpriteStore {
        &mut self.sprites
    }

    pub fn synthesizer(&self) -> &Synthesizer {
        &self.synthesizer
    }

    pub fn synthesizer_mut(&mut self) -> &mut Synthesizer {
        &mut self.synthesizer
    }

    pub(crate) fn audio_bridge(&self) -> Option<&AudioBridge> {
        self.audio.as_ref()
    }

    pub(crate) fn push_draw(&mut self, command: DrawCommand) {
        self.draw_list.push(command);
    }
}
