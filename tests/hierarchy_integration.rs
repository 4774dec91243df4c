//! Integration tests for the scene graph lifecycle: init/update order,
//! disabled subtrees, late additions, and subscriptions owned by entities.
//!
//! # Usage
//!
//! ```sh
//! cargo test --test hierarchy_integration
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use arcadecore::components::input::{InputComponent, InputController};
use arcadecore::events::Event;
use arcadecore::platform::headless::{HeadlessHandle, HeadlessPlatform};
use arcadecore::platform::{Dimension, Rgba};
use arcadecore::resources::gameconfig::EngineConfig;
use arcadecore::{Engine, Entity, EntityId, Sender};

type Log = Rc<RefCell<Vec<String>>>;

/// Records lifecycle calls of its entity into a shared log.
struct Recorder {
    log: Log,
}

impl InputController for Recorder {
    fn init(&mut self, entity: EntityId, engine: &mut Engine) {
        let name = engine.scene().get(entity).unwrap().name().to_string();
        self.log.borrow_mut().push(format!("init {}", name));
    }

    fn reset(&mut self) {
        self.log.borrow_mut().push("reset".to_string());
    }

    fn update(&mut self, entity: EntityId, engine: &mut Engine) {
        let name = engine.scene().get(entity).unwrap().name().to_string();
        self.log.borrow_mut().push(name);
    }
}

fn recorded(name: &str, order: i32, log: &Log) -> Entity {
    Entity::new(name, order).with_input(InputComponent::new(Recorder { log: log.clone() }))
}

fn engine() -> (Engine, HeadlessHandle) {
    let _ = env_logger::builder().is_test(true).try_init();
    let (platform, handle) = HeadlessPlatform::new();
    (Engine::new(platform, EngineConfig::new()), handle)
}

fn tick(engine: &mut Engine, handle: &HeadlessHandle) {
    handle.advance(1.0 / 60.0);
    assert!(engine.update());
}

/// root
/// ├── hud (100)
/// │   └── score (0)
/// ├── board (10)
/// │   ├── cube_b (2)
/// │   └── cube_a (1)
/// └── player (50)
fn build(engine: &mut Engine, log: &Log) -> EntityId {
    let scene = engine.scene_mut();
    let root = scene.spawn(recorded("root", 0, log));
    let hud = scene.add_child(root, recorded("hud", 100, log)).unwrap();
    scene.add_child(hud, recorded("score", 0, log));
    let board = scene.add_child(root, recorded("board", 10, log)).unwrap();
    scene.add_child(board, recorded("cube_b", 2, log));
    scene.add_child(board, recorded("cube_a", 1, log));
    scene.add_child(root, recorded("player", 50, log));
    root
}

#[test]
fn init_and_update_follow_sibling_order_depth_first() {
    let log: Log = Rc::default();
    let (mut engine, handle) = engine();
    let root = build(&mut engine, &log);
    assert!(engine.init(root, "hierarchy", Dimension::new(64, 64), Rgba::BLACK));
    assert_eq!(
        *log.borrow(),
        vec![
            "init root",
            "init board",
            "init cube_a",
            "init cube_b",
            "init player",
            "init hud",
            "init score"
        ]
    );

    log.borrow_mut().clear();
    engine.update();
    assert!(log.borrow().is_empty(), "first update only starts the clock");

    tick(&mut engine, &handle);
    assert_eq!(
        *log.borrow(),
        vec!["root", "board", "cube_a", "cube_b", "player", "hud", "score"]
    );
}

#[test]
fn disabled_subtree_is_skipped() {
    let log: Log = Rc::default();
    let (mut engine, handle) = engine();
    let root = build(&mut engine, &log);
    engine.init(root, "hierarchy", Dimension::new(64, 64), Rgba::BLACK);
    engine.update();
    let board = engine.scene().find_child(root, "board").unwrap();
    engine.scene_mut().get_mut(board).unwrap().enabled = false;

    log.borrow_mut().clear();
    tick(&mut engine, &handle);
    assert_eq!(*log.borrow(), vec!["root", "player", "hud", "score"]);
}

#[test]
fn reordering_changes_update_order() {
    let log: Log = Rc::default();
    let (mut engine, handle) = engine();
    let root = build(&mut engine, &log);
    engine.init(root, "hierarchy", Dimension::new(64, 64), Rgba::BLACK);
    engine.update();
    let hud = engine.scene().find_child(root, "hud").unwrap();
    engine.scene_mut().set_order(hud, -1);

    log.borrow_mut().clear();
    tick(&mut engine, &handle);
    assert_eq!(
        *log.borrow(),
        vec!["root", "hud", "score", "board", "cube_a", "cube_b", "player"]
    );
}

#[test]
fn children_added_while_running_are_initialized() {
    let log: Log = Rc::default();
    let (mut engine, handle) = engine();
    let root = engine.scene_mut().spawn(Entity::new("root", 0));
    engine.init(root, "hierarchy", Dimension::new(64, 64), Rgba::BLACK);
    engine.update();

    let enemy = engine.add_child(root, recorded("enemy", 5, &log)).unwrap();
    assert_eq!(*log.borrow(), vec!["init enemy"]);
    tick(&mut engine, &handle);
    assert_eq!(*log.borrow(), vec!["init enemy", "enemy"]);

    assert!(engine.remove_child(root, "enemy"));
    assert!(!engine.scene().contains(enemy));
    tick(&mut engine, &handle);
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn reset_visits_every_component_and_keeps_structure() {
    let log: Log = Rc::default();
    let (mut engine, _handle) = engine();
    let root = build(&mut engine, &log);
    engine.init(root, "hierarchy", Dimension::new(64, 64), Rgba::BLACK);
    let before = engine.scene().descendants(root);

    log.borrow_mut().clear();
    engine.reset();
    assert_eq!(log.borrow().len(), 7);
    assert!(log.borrow().iter().all(|entry| entry == "reset"));
    assert_eq!(engine.scene().descendants(root), before);
}

#[test]
fn entity_owned_subscriptions_die_with_the_entity() {
    let (mut engine, _handle) = engine();
    let root = engine.scene_mut().spawn(Entity::new("root", 0));
    let enemy = engine
        .scene_mut()
        .add_child(root, Entity::new("enemy", 0))
        .unwrap();
    let hits = Rc::new(RefCell::new(0));
    let counter = hits.clone();
    let killed = Event::new("PlayerKilled");
    assert!(engine.subscribe_for(
        enemy,
        move |_: &Event, _, _: &mut Engine| *counter.borrow_mut() += 1,
        &killed,
        None,
    ));
    assert!(!engine.subscribe_for(
        EntityId::from_bits(u64::MAX),
        |_: &Event, _, _: &mut Engine| {},
        &killed,
        None,
    ));

    engine.notify(&killed, Sender::Engine);
    assert_eq!(*hits.borrow(), 1);

    engine.scene_mut().destroy(enemy);
    engine.notify(&killed, Sender::Engine);
    assert_eq!(*hits.borrow(), 1);
    assert_eq!(engine.bus().subscriber_count(&killed), 0);
}

#[test]
fn handlers_may_destroy_entities_mid_update() {
    let log: Log = Rc::default();
    let (mut engine, handle) = engine();
    let root = build(&mut engine, &log);
    engine.init(root, "hierarchy", Dimension::new(64, 64), Rgba::BLACK);
    engine.update();

    // Destroying the board from a timer, before the traversal, removes it
    // from this very frame.
    engine.create_effective_timer(0.0, move |engine| {
        engine.remove_child(root, "board");
    });
    log.borrow_mut().clear();
    tick(&mut engine, &handle);
    assert_eq!(*log.borrow(), vec!["root", "player", "hud", "score"]);
    assert_eq!(engine.scene().len(), 4);
}
