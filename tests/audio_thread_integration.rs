//! The mixer driven from a real audio thread, the way a windowed platform
//! runs it: the platform moves the `Mixer` onto its own thread and pulls
//! buffers there while the engine ticks on the test thread.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use arcadecore::components::Capability;
use arcadecore::components::audio::AudioComponent;
use arcadecore::events::{DID_FINISH_SOUND, Event};
use arcadecore::platform::{Dimension, DrawCommand, Platform, PlatformError, Rgba};
use arcadecore::resources::gameconfig::EngineConfig;
use arcadecore::resources::input::KeyStatus;
use arcadecore::resources::spritestore::SpriteStore;
use arcadecore::synth::{Algorithm, Operator, Waveform};
use arcadecore::systems::audio::Mixer;
use arcadecore::{Engine, Entity, EntityId, Sender};

const SAMPLE_RATE: u32 = 8000;
const BUFFER_FRAMES: usize = 64;

/// What the test thread can see of the audio thread.
#[derive(Debug, Clone, Default)]
struct AudioThreadView {
    now: Rc<Cell<f64>>,
    active: Arc<AtomicUsize>,
    joined: Rc<Cell<bool>>,
}

struct ThreadedPlatform {
    view: AudioThreadView,
    worker: Option<JoinHandle<()>>,
}

impl Platform for ThreadedPlatform {
    fn open(
        &mut self,
        _title: &str,
        _dimensions: Dimension,
        _scale: u32,
        _background: Rgba,
    ) -> Result<(), PlatformError> {
        Ok(())
    }

    fn elapsed_seconds(&self) -> f64 {
        self.view.now.get()
    }

    fn poll_input(&mut self, _keys: &mut KeyStatus) -> bool {
        false
    }

    fn present(&mut self, _commands: &[DrawCommand], _sprites: &SpriteStore) {}

    fn start_audio(
        &mut self,
        mut mixer: Mixer,
        _config: &EngineConfig,
    ) -> Result<(), PlatformError> {
        let active = self.view.active.clone();
        let worker = thread::Builder::new()
            .name("audio".into())
            .spawn(move || {
                let mut buffer = [0i16; BUFFER_FRAMES];
                loop {
                    let alive = mixer.fill(&mut buffer);
                    active.store(mixer.active(), Ordering::SeqCst);
                    if !alive {
                        break;
                    }
                    thread::sleep(Duration::from_millis(1));
                }
            })
            .map_err(|e| PlatformError::Audio(e.to_string()))?;
        self.worker = Some(worker);
        Ok(())
    }

    fn close(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.join().unwrap();
            self.view.joined.set(true);
        }
    }
}

fn running() -> (Engine, AudioThreadView, EntityId) {
    let _ = env_logger::builder().is_test(true).try_init();
    let view = AudioThreadView::default();
    let platform = ThreadedPlatform {
        view: view.clone(),
        worker: None,
    };
    let config = EngineConfig {
        sample_rate: SAMPLE_RATE,
        ..EngineConfig::new()
    };
    let mut engine = Engine::new(platform, config);
    engine
        .synthesizer_mut()
        .add_algorithm("beep", Algorithm::new(vec![Operator::new(440.0, Waveform::Square)]))
        .unwrap();
    let root = engine.scene_mut().spawn(Entity::new("root", 0));
    let player = engine
        .scene_mut()
        .add_child(root, Entity::new("player", 0).with_audio(AudioComponent::new()))
        .unwrap();
    assert!(engine.init(root, "audio thread", Dimension::new(64, 64), Rgba::BLACK));
    assert!(engine.update());
    (engine, view, player)
}

fn play(engine: &mut Engine, entity: EntityId, duration: f64) {
    engine
        .scene_mut()
        .get_mut(entity)
        .unwrap()
        .audio_mut()
        .unwrap()
        .play_sound("beep", duration, 0.0, 0.0);
}

fn tick(engine: &mut Engine, view: &AudioThreadView) {
    view.now.set(view.now.get() + 0.016);
    assert!(engine.update());
}

/// Tick the engine until `done` holds, or fail after a generous timeout.
fn tick_until(engine: &mut Engine, view: &AudioThreadView, mut done: impl FnMut(&Engine) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done(&*engine) {
        assert!(Instant::now() < deadline, "audio thread did not catch up");
        thread::sleep(Duration::from_millis(2));
        tick(engine, view);
    }
}

fn finished_log(engine: &Engine) -> Rc<RefCell<Vec<Sender>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let inner = log.clone();
    engine.observe(
        move |_: &Event, sender, _: &mut Engine| inner.borrow_mut().push(sender),
        &DID_FINISH_SOUND,
        None,
    );
    log
}

#[test]
fn sound_finished_on_the_audio_thread_is_published_on_the_engine_thread() {
    let (mut engine, view, player) = running();
    let finished = finished_log(&engine);

    play(&mut engine, player, 0.02);
    tick(&mut engine, &view);
    assert_eq!(engine.scene().get(player).unwrap().audio().unwrap().playing(), 1);

    tick_until(&mut engine, &view, |_| !finished.borrow().is_empty());
    assert_eq!(
        *finished.borrow(),
        vec![Sender::Component(player, Capability::Audio)]
    );
    assert_eq!(engine.scene().get(player).unwrap().audio().unwrap().playing(), 0);
    assert_eq!(view.active.load(Ordering::SeqCst), 0);

    engine.destroy();
}

#[test]
fn reset_stops_sounds_on_the_audio_thread_without_reporting_them() {
    let (mut engine, view, player) = running();
    let finished = finished_log(&engine);

    play(&mut engine, player, 0.5);
    play(&mut engine, player, 0.5);
    tick(&mut engine, &view);
    tick_until(&mut engine, &view, |_| view.active.load(Ordering::SeqCst) == 2);

    engine.reset();
    tick_until(&mut engine, &view, |_| view.active.load(Ordering::SeqCst) == 0);
    // Well past the sounds' own duration.
    for _ in 0..40 {
        thread::sleep(Duration::from_millis(2));
        tick(&mut engine, &view);
    }
    assert!(finished.borrow().is_empty());
    assert_eq!(engine.scene().get(player).unwrap().audio().unwrap().playing(), 0);

    engine.destroy();
}

#[test]
fn destroy_shuts_down_and_joins_the_audio_thread() {
    let (mut engine, view, player) = running();
    play(&mut engine, player, 10.0);
    tick(&mut engine, &view);
    tick_until(&mut engine, &view, |_| view.active.load(Ordering::SeqCst) == 1);

    engine.destroy();
    assert!(view.joined.get());
    assert_eq!(view.active.load(Ordering::SeqCst), 0);
}
