//! Time update system.
//!
//! Advances the engine clocks to the platform's wall time once per frame and
//! fires the timers that became due.
use log::trace;

use crate::engine::Engine;

/// Advance both clocks of the engine to the absolute wall time `now`.
pub fn update_world_time(engine: &mut Engine, now: f64) {
    engine.time_mut().advance(now);
}

/// Run every due timer, in firing order. Timers scheduled by these callbacks
/// wait for the next frame. Returns how many fired.
pub fn fire_timers(engine: &mut Engine) -> usize {
    let due = engine.take_due_timers();
    let count = due.len();
    for timer in due {
        trace!("timer #{} ({:?}) fired", timer.sequence, timer.clock);
        timer.fire(engine);
    }
    count
}
