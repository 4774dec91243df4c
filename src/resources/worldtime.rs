//! The two simulation clocks.
//!
//! `accumulative` follows wall time since the first tick. `effective` is
//! wall time minus everything spent paused, and is what animations and
//! effective timers read. Both are recomputed from the absolute platform time
//! on every [`WorldTime::advance`], so they never drift.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTime {
    origin: Option<f64>,
    now: f64,
    accumulative: f64,
    paused_total: f64,
    paused_since: Option<f64>,
    wall_delta: f32,
    delta: f32,
    frame_count: u64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            origin: None,
            now: 0.0,
            accumulative: 0.0,
            paused_total: 0.0,
            paused_since: None,
            wall_delta: 0.0,
            delta: 0.0,
            frame_count: 0,
        }
    }
}

impl WorldTime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance both clocks to the absolute platform time `now` (seconds).
    ///
    /// The first call only records the origin, so it yields zero deltas.
    pub fn advance(&mut self, now: f64) {
        let origin = *self.origin.get_or_insert(now);
        let accumulative = (now - origin).max(self.accumulative);
        let wall_delta = accumulative - self.accumulative;
        self.now = now;
        self.accumulative = accumulative;
        self.wall_delta = wall_delta as f32;
        self.delta = if self.is_paused() { 0.0 } else { wall_delta as f32 };
        self.frame_count += 1;
    }

    /// Seconds of wall time since the first tick.
    pub fn accumulative(&self) -> f64 {
        self.accumulative
    }

    /// Accumulative time minus the total time spent paused (frozen while
    /// paused).
    pub fn effective(&self) -> f64 {
        let pausing = self
            .paused_since
            .map_or(0.0, |since| self.accumulative - since);
        self.accumulative - self.paused_total - pausing
    }

    /// Effective seconds elapsed in the last tick; zero while paused.
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Wall seconds elapsed in the last tick.
    pub fn wall_delta(&self) -> f32 {
        self.wall_delta
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn is_paused(&self) -> bool {
        self.paused_since.is_some()
    }

    /// Freeze the effective clock. Returns `false` if it already was.
    pub fn pause(&mut self) -> bool {
        if self.is_paused() {
            return false;
        }
        self.paused_since = Some(self.accumulative);
        true
    }

    /// Unfreeze the effective clock. Returns `false` if it was not paused.
    pub fn resume(&mut self) -> bool {
        match self.paused_since.take() {
            Some(since) => {
                self.paused_total += self.accumulative - since;
                true
            }
            None => false,
        }
    }

    /// Distance between the accumulative and effective clocks (total time
    /// spent paused so far).
    pub(crate) fn effective_offset(&self) -> f64 {
        self.accumulative - self.effective()
    }
}
