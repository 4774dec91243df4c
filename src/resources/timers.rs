//! One-shot timers on the effective and accumulative clocks.
//!
//! Timers store an absolute end time on their clock. Every tick the engine
//! calls [`TimerScheduler::take_due`] after advancing [`WorldTime`] and runs
//! the returned callbacks. Due timers from both clocks are interleaved by the
//! wall-clock moment each became due, ties broken by creation order.
//!
//! There is no periodic mode and no cancellation: a callback that wants to
//! repeat schedules a new timer.

use std::fmt;

use log::debug;

use crate::resources::worldtime::WorldTime;

/// Which clock a timer counts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerClock {
    /// Freezes while the engine is paused.
    Effective,
    /// Follows wall time regardless of pauses.
    Accumulative,
}

pub type TimerCallback<C> = Box<dyn FnOnce(&mut C)>;

struct Timer<C> {
    clock: TimerClock,
    end: f64,
    sequence: u64,
    callback: TimerCallback<C>,
}

/// A timer that has become due, ready to run.
pub struct DueTimer<C> {
    pub clock: TimerClock,
    pub sequence: u64,
    callback: TimerCallback<C>,
}

impl<C> DueTimer<C> {
    pub fn fire(self, ctx: &mut C) {
        (self.callback)(ctx);
    }
}

pub struct TimerScheduler<C> {
    timers: Vec<Timer<C>>,
    next_sequence: u64,
}

impl<C> Default for TimerScheduler<C> {
    fn default() -> Self {
        Self {
            timers: Vec::new(),
            next_sequence: 0,
        }
    }
}

impl<C> fmt::Debug for TimerScheduler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerScheduler")
            .field("pending", &self.timers.len())
            .field("next_sequence", &self.next_sequence)
            .finish()
    }
}

impl<C> TimerScheduler<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `callback` once `duration` seconds of effective time have passed.
    pub fn create_effective_timer(
        &mut self,
        time: &WorldTime,
        duration: f64,
        callback: impl FnOnce(&mut C) + 'static,
    ) -> u64 {
        self.push(TimerClock::Effective, time.effective() + duration, callback)
    }

    /// Run `callback` once `duration` seconds of wall time have passed,
    /// whether or not the engine is paused.
    pub fn create_accumulative_timer(
        &mut self,
        time: &WorldTime,
        duration: f64,
        callback: impl FnOnce(&mut C) + 'static,
    ) -> u64 {
        self.push(
            TimerClock::Accumulative,
            time.accumulative() + duration,
            callback,
        )
    }

    /// Remove and return every timer whose end time has been reached, in
    /// firing order.
    pub fn take_due(&mut self, time: &WorldTime) -> Vec<DueTimer<C>> {
        let effective = time.effective();
        let accumulative = time.accumulative();
        let offset = time.effective_offset();

        let (due, pending): (Vec<_>, Vec<_>) =
            self.timers.drain(..).partition(|timer| match timer.clock {
                TimerClock::Effective => effective >= timer.end,
                TimerClock::Accumulative => accumulative >= timer.end,
            });
        self.timers = pending;

        let mut due: Vec<(f64, Timer<C>)> = due
            .into_iter()
            .map(|timer| {
                let wall = match timer.clock {
                    TimerClock::Effective => timer.end + offset,
                    TimerClock::Accumulative => timer.end,
                };
                (wall, timer)
            })
            .collect();
        due.sort_by(|(wa, a), (wb, b)| wa.total_cmp(wb).then(a.sequence.cmp(&b.sequence)));

        if !due.is_empty() {
            debug!("{} timer(s) due at t={:.3}", due.len(), accumulative);
        }
        due.into_iter()
            .map(|(_, timer)| DueTimer {
                clock: timer.clock,
                sequence: timer.sequence,
                callback: timer.callback,
            })
            .collect()
    }

    /// Take the due timers and run them against `ctx`. Timers created by the
    /// callbacks wait for the next call.
    pub fn fire_due(&mut self, time: &WorldTime, ctx: &mut C) -> usize {
        let due = self.take_due(time);
        let count = due.len();
        for timer in due {
            timer.fire(ctx);
        }
        count
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    fn push(
        &mut self,
        clock: TimerClock,
        end: f64,
        callback: impl FnOnce(&mut C) + 'static,
    ) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.timers.push(Timer {
            clock,
            end,
            sequence,
            callback: Box::new(callback),
        });
        sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log {
        fired: Vec<&'static str>,
    }

    fn clock_at(points: &[f64]) -> WorldTime {
        let mut time = WorldTime::new();
        for p in points {
            time.advance(*p);
        }
        time
    }

    #[test]
    fn fires_in_due_order() {
        let mut time = clock_at(&[0.0]);
        let mut timers: TimerScheduler<Log> = TimerScheduler::new();
        let mut log = Log::default();
        timers.create_effective_timer(&time, 2.0, |l: &mut Log| l.fired.push("late"));
        timers.create_effective_timer(&time, 1.0, |l: &mut Log| l.fired.push("early"));

        time.advance(0.5);
        assert_eq!(timers.fire_due(&time, &mut log), 0);
        time.advance(3.0);
        assert_eq!(timers.fire_due(&time, &mut log), 2);
        assert_eq!(log.fired, vec!["early", "late"]);
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn equal_deadlines_fire_in_creation_order() {
        let mut time = clock_at(&[0.0]);
        let mut timers: TimerScheduler<Log> = TimerScheduler::new();
        let mut log = Log::default();
        timers.create_effective_timer(&time, 1.0, |l: &mut Log| l.fired.push("a"));
        timers.create_accumulative_timer(&time, 1.0, |l: &mut Log| l.fired.push("b"));
        timers.create_effective_timer(&time, 1.0, |l: &mut Log| l.fired.push("c"));
        time.advance(1.0);
        timers.fire_due(&time, &mut log);
        assert_eq!(log.fired, vec!["a", "b", "c"]);
    }

    #[test]
    fn pause_delays_effective_but_not_accumulative() {
        let mut time = clock_at(&[0.0, 1.0]);
        let mut timers: TimerScheduler<Log> = TimerScheduler::new();
        let mut log = Log::default();
        timers.create_effective_timer(&time, 2.0, |l: &mut Log| l.fired.push("effective"));
        timers.create_accumulative_timer(&time, 2.0, |l: &mut Log| l.fired.push("wall"));
        time.pause();

        time.advance(3.0);
        timers.fire_due(&time, &mut log);
        assert_eq!(log.fired, vec!["wall"]);

        time.advance(4.0);
        time.resume();
        time.advance(5.9);
        timers.fire_due(&time, &mut log);
        assert_eq!(log.fired, vec!["wall"]);

        time.advance(6.0);
        timers.fire_due(&time, &mut log);
        assert_eq!(log.fired, vec!["wall", "effective"]);
    }

    #[test]
    fn interleaves_clocks_by_wall_moment() {
        // Paused for 2s: an effective timer ending at 1.0 became due at wall 3.0,
        // after an accumulative timer ending at 2.5.
        let mut time = clock_at(&[0.0]);
        let mut timers: TimerScheduler<Log> = TimerScheduler::new();
        let mut log = Log::default();
        timers.create_effective_timer(&time, 1.0, |l: &mut Log| l.fired.push("effective"));
        timers.create_accumulative_timer(&time, 2.5, |l: &mut Log| l.fired.push("wall"));
        time.pause();
        time.advance(2.0);
        time.resume();
        time.advance(3.5);
        timers.fire_due(&time, &mut log);
        assert_eq!(log.fired, vec!["wall", "effective"]);
    }

    #[test]
    fn timers_created_while_firing_wait_for_next_pass() {
        let mut time = clock_at(&[0.0]);
        let mut timers: TimerScheduler<Log> = TimerScheduler::new();
        timers.create_effective_timer(&time, 0.0, |l: &mut Log| l.fired.push("first"));
        time.advance(1.0);

        let mut log = Log::default();
        let due = timers.take_due(&time);
        assert_eq!(due.len(), 1);
        // A re-arm issued while the due list is being fired.
        timers.create_effective_timer(&time, 0.0, |l: &mut Log| l.fired.push("again"));
        for timer in due {
            timer.fire(&mut log);
        }
        assert_eq!(log.fired, vec!["first"]);
        assert_eq!(timers.pending(), 1);

        timers.fire_due(&time, &mut log);
        assert_eq!(log.fired, vec!["first", "again"]);
    }
}
