//! Spline-based motion playback.
//!
//! An [`AnimationComponent`] stores named curves. A curve is a list of
//! [`CurvePoint`]s; each consecutive pair is one cubic-Hermite segment, and a
//! playing animation spreads its total duration evenly over the segments.
//! Positions on a curve are offsets from the entity's local position at the
//! moment the animation started.
//!
//! The free functions here are the pure math; starting and advancing an
//! animation against the engine clock lives in
//! [`crate::systems::animation`].

use std::path::Path;
use std::sync::Arc;

use glam::Vec2;
use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::assets::{AssetError, load_animation_path};
use crate::scene::EntityId;

/// A control point: position offset and tangent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CurvePoint {
    pub position: Vec2,
    pub tangent: Vec2,
}

impl CurvePoint {
    pub fn new(position: Vec2, tangent: Vec2) -> Self {
        Self { position, tangent }
    }
}

/// Hermite basis at `t`, computed in double precision: `(h_p0, h_m0, h_m1, h_p1)`.
pub fn hermite_weights(t: f64) -> (f32, f32, f32, f32) {
    let t2 = t * t;
    let t3 = t2 * t;
    let h_p0 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h_m0 = t3 - 2.0 * t2 + t;
    let h_m1 = t3 - t2;
    let h_p1 = 3.0 * t2 - 2.0 * t3;
    (h_p0 as f32, h_m0 as f32, h_m1 as f32, h_p1 as f32)
}

/// Point at `t` in `[0, 1]` on the segment from `a` to `b`.
pub fn hermite_point(a: &CurvePoint, b: &CurvePoint, t: f64) -> Vec2 {
    let (h_p0, h_m0, h_m1, h_p1) = hermite_weights(t);
    h_p0 * a.position + h_m0 * a.tangent + h_p1 * b.position + h_m1 * b.tangent
}

/// Offset on `points` after `elapsed` seconds of an animation lasting
/// `duration`. Past the end this is the last control point. `None` for
/// curves with fewer than two points.
pub fn evaluate_curve(points: &[CurvePoint], duration: f64, elapsed: f64) -> Option<Vec2> {
    let last = points.last()?;
    if points.len() < 2 {
        return None;
    }
    if elapsed >= duration || duration <= 0.0 {
        return Some(last.position);
    }
    let elapsed = elapsed.max(0.0);
    let last_segment = points.len() - 2;
    let segment_duration = duration / (points.len() - 1) as f64;
    let index = (elapsed / segment_duration).floor() as usize;
    let (index, t) = if index > last_segment {
        (last_segment, 1.0)
    } else {
        (index, (elapsed % segment_duration) / segment_duration)
    };
    Some(hermite_point(&points[index], &points[index + 1], t))
}

/// Two-point curve following a ballistic arc to `end` under `gravity` over
/// `duration` seconds.
pub fn ballistic_curve(end: Vec2, gravity: Vec2, duration: f32) -> Vec<CurvePoint> {
    let drop = gravity * duration * duration * 0.5;
    vec![
        CurvePoint::new(Vec2::ZERO, end - drop),
        CurvePoint::new(end, end + drop),
    ]
}

/// Curve through the running sums of per-step displacements, starting at
/// the origin, with Catmull-Rom tangents (one-sided at both ends).
pub fn curve_from_displacements(steps: &[Vec2]) -> Vec<CurvePoint> {
    let mut positions = Vec::with_capacity(steps.len() + 1);
    let mut current = Vec2::ZERO;
    positions.push(current);
    for step in steps {
        current += *step;
        positions.push(current);
    }
    let n = positions.len();
    if n < 2 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let tangent = if i == 0 {
                positions[1] - positions[0]
            } else if i == n - 1 {
                positions[n - 1] - positions[n - 2]
            } else {
                (positions[i + 1] - positions[i - 1]) * 0.5
            };
            CurvePoint::new(positions[i], tangent)
        })
        .collect()
}

/// State of the curve currently playing.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveAnimation {
    pub curve_id: String,
    /// Control points as they were when playback started. Later edits to
    /// the named curve do not affect a running animation.
    pub points: Arc<[CurvePoint]>,
    pub duration: f64,
    /// Effective-clock time at which playback started.
    pub started_at: f64,
    /// Entity local position at start.
    pub origin: Vec2,
    pub update_velocity_on_finish: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AnimationComponent {
    curves: FxHashMap<String, Vec<CurvePoint>>,
    active: Option<ActiveAnimation>,
    pub(super) owner: Option<EntityId>,
}

impl AnimationComponent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a control point to `curve_id`, creating the curve if needed.
    pub fn add_segment(&mut self, curve_id: &str, position: Vec2, tangent: Vec2) {
        self.curves
            .entry(curve_id.to_string())
            .or_default()
            .push(CurvePoint::new(position, tangent));
    }

    /// Replace `curve_id` with `points`.
    pub fn add_curve(&mut self, curve_id: &str, points: Vec<CurvePoint>) {
        self.curves.insert(curve_id.to_string(), points);
    }

    pub fn add_ballistic_curve(&mut self, curve_id: &str, end: Vec2, gravity: Vec2, duration: f32) {
        self.add_curve(curve_id, ballistic_curve(end, gravity, duration));
    }

    /// Load a legacy path file into `curve_id`. Nothing changes on error.
    pub fn load_curve_from_file(
        &mut self,
        curve_id: &str,
        path: impl AsRef<Path>,
    ) -> Result<(), AssetError> {
        let steps = load_animation_path(path)?;
        self.add_curve(curve_id, curve_from_displacements(&steps));
        Ok(())
    }

    pub fn remove_curve(&mut self, curve_id: &str) -> bool {
        let removed = self.curves.remove(curve_id).is_some();
        if !removed {
            debug!("remove_curve: unknown curve '{}'", curve_id);
        }
        removed
    }

    pub fn curve(&self, curve_id: &str) -> Option<&[CurvePoint]> {
        self.curves.get(curve_id).map(Vec::as_slice)
    }

    pub fn animating(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&ActiveAnimation> {
        self.active.as_ref()
    }

    /// Start playing `curve_id`. Refused (returns `false`) while another
    /// animation plays, for unknown curves and for curves with fewer than two
    /// points.
    pub fn begin(
        &mut self,
        curve_id: &str,
        duration: f64,
        started_at: f64,
        origin: Vec2,
        update_velocity_on_finish: bool,
    ) -> bool {
        if let Some(active) = &self.active {
            debug!(
                "perform_animation('{}') ignored: '{}' still playing",
                curve_id, active.curve_id
            );
            return false;
        }
        let points = match self.curves.get(curve_id) {
            Some(points) if points.len() >= 2 => Arc::from(points.as_slice()),
            Some(_) => {
                warn!("perform_animation: curve '{}' has fewer than two points", curve_id);
                return false;
            }
            None => {
                warn!("perform_animation: unknown curve '{}'", curve_id);
                return false;
            }
        };
        self.active = Some(ActiveAnimation {
            curve_id: curve_id.to_string(),
            points,
            duration: duration.max(0.0),
            started_at,
            origin,
            update_velocity_on_finish,
        });
        true
    }

    /// Position and finish flag for the active animation at effective time
    /// `now`: `(new_local_position, finished)`.
    pub fn sample(&self, now: f64) -> Option<(Vec2, bool)> {
        let active = self.active.as_ref()?;
        let elapsed = now - active.started_at;
        let offset = evaluate_curve(&active.points, active.duration, elapsed)?;
        Some((active.origin + offset, elapsed >= active.duration))
    }

    /// Stop the active animation and return it.
    pub fn finish(&mut self) -> Option<ActiveAnimation> {
        self.active.take()
    }

    /// Velocity to apply when `active` finishes: final tangent over duration.
    pub fn finish_velocity(&self, active: &ActiveAnimation) -> Option<Vec2> {
        if !active.update_velocity_on_finish || active.duration <= 0.0 {
            return None;
        }
        let last = active.points.last()?;
        Some(last.tangent / active.duration as f32)
    }

    /// Clear playback state; curves are kept.
    pub fn reset(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPSILON: f32 = 1e-4;

    fn approx_vec(a: Vec2, b: Vec2) -> bool {
        (a - b).abs().max_element() < EPSILON
    }

    #[test]
    fn weights_at_endpoints_and_midpoint() {
        assert_eq!(hermite_weights(0.0), (1.0, 0.0, 0.0, 0.0));
        assert_eq!(hermite_weights(1.0), (0.0, 0.0, 0.0, 1.0));
        assert_eq!(hermite_weights(0.5), (0.5, 0.125, -0.125, 0.5));
    }

    #[test]
    fn midpoint_blend_on_two_point_curve() {
        let points = [
            CurvePoint::new(Vec2::ZERO, Vec2::new(0.0, -40.0)),
            CurvePoint::new(Vec2::new(0.0, -16.0), Vec2::new(0.0, 8.0)),
        ];
        let offset = evaluate_curve(&points, 0.2, 0.1).unwrap();
        // 0.125 * -40 + 0.5 * -16 + (-0.125) * 8
        assert!(approx_vec(offset, Vec2::new(0.0, -14.0)));
    }

    #[test]
    fn past_duration_snaps_to_last_point() {
        let points = ballistic_curve(Vec2::new(16.0, 24.0), Vec2::new(0.0, 400.0), 0.5);
        assert_eq!(evaluate_curve(&points, 0.5, 0.7), Some(Vec2::new(16.0, 24.0)));
        assert_eq!(evaluate_curve(&points[..1], 0.5, 0.1), None);
    }

    #[test]
    fn ballistic_tangents() {
        let points = ballistic_curve(Vec2::new(10.0, 0.0), Vec2::new(0.0, 100.0), 0.2);
        assert!(approx_vec(points[0].tangent, Vec2::new(10.0, -2.0)));
        assert!(approx_vec(points[1].tangent, Vec2::new(10.0, 2.0)));
    }

    #[test]
    fn displacement_curve_uses_running_sums() {
        let curve = curve_from_displacements(&[Vec2::new(2.0, 0.0), Vec2::new(0.0, 4.0)]);
        assert_eq!(curve.len(), 3);
        assert_eq!(curve[1].position, Vec2::new(2.0, 0.0));
        assert_eq!(curve[2].position, Vec2::new(2.0, 4.0));
        assert_eq!(curve[0].tangent, Vec2::new(2.0, 0.0));
        assert_eq!(curve[1].tangent, Vec2::new(1.0, 2.0));
        assert_eq!(curve[2].tangent, Vec2::new(0.0, 4.0));
    }

    #[test]
    fn begin_refuses_unknown_short_or_busy() {
        let mut anim = AnimationComponent::new();
        anim.add_segment("short", Vec2::ZERO, Vec2::ZERO);
        assert!(!anim.begin("missing", 1.0, 0.0, Vec2::ZERO, false));
        assert!(!anim.begin("short", 1.0, 0.0, Vec2::ZERO, false));
        anim.add_segment("short", Vec2::ONE, Vec2::ZERO);
        assert!(anim.begin("short", 1.0, 0.0, Vec2::ZERO, false));
        assert!(!anim.begin("short", 1.0, 0.5, Vec2::ZERO, false));
        assert_eq!(anim.active().map(|a| a.started_at), Some(0.0));
        anim.reset();
        assert!(!anim.animating());
        assert!(anim.curve("short").is_some());
    }

    #[test]
    fn finish_velocity_is_tangent_over_duration() {
        let mut anim = AnimationComponent::new();
        anim.add_curve(
            "hop",
            vec![
                CurvePoint::new(Vec2::ZERO, Vec2::ZERO),
                CurvePoint::new(Vec2::ONE, Vec2::new(4.0, 8.0)),
            ],
        );
        anim.begin("hop", 0.5, 0.0, Vec2::ZERO, true);
        let (position, finished) = anim.sample(0.6).unwrap();
        assert!(finished);
        assert_eq!(position, Vec2::ONE);
        let active = anim.finish().unwrap();
        assert_eq!(anim.finish_velocity(&active), Some(Vec2::new(8.0, 16.0)));
    }

    #[test]
    fn playing_curve_is_unaffected_by_later_edits() {
        let mut anim = AnimationComponent::new();
        anim.add_segment("hop", Vec2::ZERO, Vec2::ZERO);
        anim.add_segment("hop", Vec2::new(0.0, -16.0), Vec2::ZERO);
        assert!(anim.begin("hop", 0.2, 0.0, Vec2::new(5.0, 5.0), false));

        anim.add_segment("hop", Vec2::new(100.0, 100.0), Vec2::ZERO);
        assert!(anim.remove_curve("hop"));

        let (position, finished) = anim.sample(0.3).unwrap();
        assert!(finished);
        assert_eq!(position, Vec2::new(5.0, -11.0));
        assert!(anim.finish().is_some());
        assert!(!anim.animating());
    }

    fn point() -> impl Strategy<Value = CurvePoint> {
        (-100.0f32..100.0, -100.0f32..100.0, -100.0f32..100.0, -100.0f32..100.0)
            .prop_map(|(x, y, tx, ty)| CurvePoint::new(Vec2::new(x, y), Vec2::new(tx, ty)))
    }

    proptest! {
        #[test]
        fn adjacent_segments_meet(points in prop::collection::vec(point(), 3..8)) {
            for i in 0..points.len() - 2 {
                let end_of_left = hermite_point(&points[i], &points[i + 1], 1.0);
                let start_of_right = hermite_point(&points[i + 1], &points[i + 2], 0.0);
                prop_assert!(approx_vec(end_of_left, start_of_right));
                prop_assert!(approx_vec(end_of_left, points[i + 1].position));
            }
        }

        #[test]
        fn curve_is_continuous_at_segment_boundaries(
            points in prop::collection::vec(point(), 3..6),
            duration in 0.5f64..5.0,
        ) {
            let segment = duration / (points.len() - 1) as f64;
            for k in 1..points.len() - 1 {
                let at = segment * k as f64;
                let before = evaluate_curve(&points, duration, at - 1e-7).unwrap();
                let after = evaluate_curve(&points, duration, at + 1e-7).unwrap();
                prop_assert!((before - after).abs().max_element() < 0.05);
            }
        }
    }
}
