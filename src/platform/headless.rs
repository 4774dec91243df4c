//! A platform without window or audio device.
//!
//! Time, keys and quit requests are driven by hand through a
//! [`HeadlessHandle`], which also exposes what the engine presented and lets
//! the caller pull samples from the mixer as an audio callback would.

use std::cell::RefCell;
use std::rc::Rc;

use log::info;

use crate::platform::{Dimension, DrawCommand, Platform, PlatformError, Rgba};
use crate::resources::gameconfig::EngineConfig;
use crate::resources::input::KeyStatus;
use crate::resources::spritestore::SpriteStore;
use crate::systems::audio::Mixer;

#[derive(Debug, Default)]
struct HeadlessState {
    now: f64,
    keys: KeyStatus,
    quit: bool,
    fail_open: bool,
    open: bool,
    closed: bool,
    title: String,
    dimensions: Option<Dimension>,
    frames: u64,
    last_frame: Vec<DrawCommand>,
    mixer: Option<Mixer>,
}

#[derive(Debug, Default)]
pub struct HeadlessPlatform {
    state: Rc<RefCell<HeadlessState>>,
}

/// Test-side view of a [`HeadlessPlatform`] moved into an engine.
#[derive(Debug, Clone)]
pub struct HeadlessHandle {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessPlatform {
    pub fn new() -> (Self, HeadlessHandle) {
        let platform = Self::default();
        let handle = HeadlessHandle {
            state: platform.state.clone(),
        };
        (platform, handle)
    }
}

impl HeadlessHandle {
    pub fn set_time(&self, seconds: f64) {
        self.state.borrow_mut().now = seconds;
    }

    pub fn advance(&self, seconds: f64) {
        self.state.borrow_mut().now += seconds;
    }

    pub fn set_keys(&self, keys: KeyStatus) {
        self.state.borrow_mut().keys = keys;
    }

    pub fn request_quit(&self) {
        self.state.borrow_mut().quit = true;
    }

    /// Make the next `open` fail.
    pub fn fail_open(&self) {
        self.state.borrow_mut().fail_open = true;
    }

    pub fn is_open(&self) -> bool {
        self.state.borrow().open
    }

    pub fn was_closed(&self) -> bool {
        self.state.borrow().closed
    }

    pub fn title(&self) -> String {
        self.state.borrow().title.clone()
    }

    pub fn frames_presented(&self) -> u64 {
        self.state.borrow().frames
    }

    pub fn last_frame(&self) -> Vec<DrawCommand> {
        self.state.borrow().last_frame.clone()
    }

    pub fn has_audio(&self) -> bool {
        self.state.borrow().mixer.is_some()
    }

    /// Pull `frames` samples from the mixer, as the audio callback would.
    /// Silence when audio was never started.
    pub fn pull_audio(&self, frames: usize) -> Vec<i16> {
        let mut out = vec![0i16; frames];
        if let Some(mixer) = self.state.borrow_mut().mixer.as_mut() {
            mixer.fill(&mut out);
        }
        out
    }
}

impl Platform for HeadlessPlatform {
    fn open(
        &mut self,
        title: &str,
        dimensions: Dimension,
        _scale: u32,
        _background: Rgba,
    ) -> Result<(), PlatformError> {
        let mut state = self.state.borrow_mut();
        if state.fail_open {
            return Err(PlatformError::Window("headless open refused".into()));
        }
        state.open = true;
        state.title = title.to_string();
        state.dimensions = Some(dimensions);
        info!(
            "headless platform opened '{}' {}x{}",
            title, dimensions.width, dimensions.height
        );
        Ok(())
    }

    fn elapsed_seconds(&self) -> f64 {
        self.state.borrow().now
    }

    fn poll_input(&mut self, keys: &mut KeyStatus) -> bool {
        let state = self.state.borrow();
        *keys = state.keys;
        state.quit
    }

    fn present(&mut self, commands: &[DrawCommand], _sprites: &SpriteStore) {
        let mut state = self.state.borrow_mut();
        state.frames += 1;
        state.last_frame = commands.to_vec();
    }

    fn start_audio(&mut self, mixer: Mixer, _config: &EngineConfig) -> Result<(), PlatformError> {
        let mut state = self.state.borrow_mut();
        if !state.open {
            return Err(PlatformError::NotOpen);
        }
        state.mixer = Some(mixer);
        Ok(())
    }

    fn close(&mut self) {
        let mut state = self.state.borrow_mut();
        state.mixer = None;
        state.open = false;
        state.closed = true;
    }
}
