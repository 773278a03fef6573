//! Timeline sampling.
//!
//! Model:
//! - A global time is clamped to `[0, duration]` and mapped to one scene.
//! - Each track contributes the value between its latest keyframe at or before the
//!   local time and the first one after it.
//! - Numbers interpolate with the later keyframe's easing (else the earlier one's,
//!   else linear). Booleans, colors and nulls hold the earlier value.
//! - The camera track interpolates spherical coordinates and the look-at point.

use plica_geometry_core::vec3::lerp;
use plica_script_core::Spherical;

use crate::camera::spherical_to_cartesian;
use crate::error::PlayerError;
use crate::registry::ElementRegistry;
use crate::state::{CameraState, SceneState};
use crate::timeline::{
    CameraKeyframe, CompiledScene, Keyframe, KeyframeValue, Timeline, TrackProperty,
};

fn clamp_time(t: f64, max: f64) -> f64 {
    if t.is_nan() {
        return 0.0;
    }
    t.clamp(0.0, max.max(0.0))
}

fn pick_scene(timeline: &Timeline, t: f64) -> Result<&CompiledScene, PlayerError> {
    timeline.scene_at(t).ok_or(PlayerError::EmptyTimeline)
}

/// Latest keyframe with `time <= t` and first keyframe with `time > t`.
fn bracket<'k, K>(
    keyframes: &'k [K],
    t: f64,
    time: impl Fn(&K) -> f64,
) -> (Option<&'k K>, Option<&'k K>) {
    let split = keyframes.partition_point(|k| time(k) <= t);
    let prev = split.checked_sub(1).and_then(|i| keyframes.get(i));
    (prev, keyframes.get(split))
}

/// Value of a keyframe track at local time `t`; `None` before its first keyframe.
pub fn sample_keyframes(keyframes: &[Keyframe], t: f64) -> Option<KeyframeValue> {
    let (prev, next) = bracket(keyframes, t, |k| k.time);
    let prev = prev?;
    let Some(next) = next else {
        return Some(prev.value.clone());
    };

    match (&prev.value, &next.value) {
        (KeyframeValue::Number(a), KeyframeValue::Number(b)) => {
            let span = next.time - prev.time;
            if span <= 0.0 {
                return Some(next.value.clone());
            }
            let easing = next.easing.or(prev.easing).unwrap_or_default();
            let eased = easing.apply((t - prev.time) / span);
            Some(KeyframeValue::Number(lerp(*a, *b, eased)))
        }
        _ => Some(prev.value.clone()),
    }
}

fn sample_camera(track: &[CameraKeyframe], t: f64) -> CameraState {
    let Some(first) = track.first() else {
        return CameraState::default();
    };
    let (prev, next) = bracket(track, t, |k| k.time);
    let prev = prev.unwrap_or(first);

    let Some(next) = next else {
        return CameraState {
            position: spherical_to_cartesian(prev.spherical),
            look_at: prev.look_at,
            spherical: Some(prev.spherical),
        };
    };

    let span = next.time - prev.time;
    let raw = if span <= 0.0 {
        1.0
    } else {
        (t - prev.time) / span
    };
    let eased = next.easing.apply(raw);
    let spherical = Spherical::new(
        lerp(prev.spherical.radius, next.spherical.radius, eased),
        lerp(prev.spherical.theta, next.spherical.theta, eased),
        lerp(prev.spherical.phi, next.spherical.phi, eased),
    );
    CameraState {
        position: spherical_to_cartesian(spherical),
        look_at: prev.look_at.lerp(next.look_at, eased),
        spherical: Some(spherical),
    }
}

/// Sample `timeline` at global time `t` (seconds). Out-of-range times clamp.
pub fn sample(timeline: &Timeline, t: f64) -> Result<SceneState, PlayerError> {
    let global_time = clamp_time(t, timeline.duration);
    let scene = pick_scene(timeline, global_time)?;
    let local = clamp_time(global_time - scene.start_time, scene.duration());

    let mut state = SceneState {
        current_scene_id: scene.id.clone(),
        global_time,
        scene_local_time: local,
        camera: sample_camera(&scene.camera_track, local),
        subtitle: scene.narration.clone(),
        active_measurements: scene.active_measurements.clone(),
        ..SceneState::default()
    };

    for track in &scene.action_tracks {
        let Some(value) = sample_keyframes(&track.keyframes, local) else {
            continue;
        };
        let target = &track.target_id;
        match (track.property, value) {
            (TrackProperty::Visibility, KeyframeValue::Bool(true)) => {
                state.visible_elements.insert(target.clone());
            }
            (TrackProperty::Visibility, KeyframeValue::Bool(false)) => {
                state.visible_elements.shift_remove(target);
            }
            (TrackProperty::Opacity, KeyframeValue::Number(v)) => {
                state.opacities.insert(target.clone(), v);
            }
            (TrackProperty::Highlight, KeyframeValue::Color(c)) => {
                state.highlights.insert(target.clone(), c);
            }
            (TrackProperty::Highlight, KeyframeValue::Null) => {
                state.highlights.shift_remove(target);
            }
            (TrackProperty::Param, KeyframeValue::Number(v)) => {
                state.param_values.insert(target.clone(), v);
            }
            (TrackProperty::Fold, KeyframeValue::Number(v)) => {
                state.fold_angles.insert(target.clone(), v);
            }
            _ => {}
        }
    }

    Ok(state)
}

/// A compiled timeline and its element registry, ready for per-frame sampling.
#[derive(Clone, Debug)]
pub struct TimelinePlayer {
    timeline: Timeline,
    registry: ElementRegistry,
}

impl TimelinePlayer {
    pub fn new(timeline: Timeline, registry: ElementRegistry) -> Self {
        Self { timeline, registry }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    pub fn duration(&self) -> f64 {
        self.timeline.duration
    }

    pub fn current_scene_id(&self, t: f64) -> Result<&str, PlayerError> {
        let t = clamp_time(t, self.timeline.duration);
        pick_scene(&self.timeline, t).map(|s| s.id.as_str())
    }

    pub fn state_at(&self, t: f64) -> Result<SceneState, PlayerError> {
        sample(&self.timeline, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use approx::assert_relative_eq;

    #[test]
    fn numbers_interpolate_with_the_later_easing() {
        let track = vec![
            Keyframe::new(0.0, 0.0),
            Keyframe::eased(2.0, 1.0, Easing::EaseIn),
        ];
        assert_eq!(sample_keyframes(&track, -1.0), None);
        let mid = sample_keyframes(&track, 1.0).and_then(|v| v.as_number());
        assert_relative_eq!(mid.unwrap(), 0.25);
        assert_eq!(sample_keyframes(&track, 5.0), Some(KeyframeValue::Number(1.0)));
    }

    #[test]
    fn zero_length_span_takes_the_next_value() {
        let track = vec![
            Keyframe::new(1.0, 0.0),
            Keyframe::new(1.0, 0.4),
            Keyframe::new(1.0, 0.7),
        ];
        // All keyframes share t = 1, so the last at-or-before wins.
        assert_eq!(sample_keyframes(&track, 1.0), Some(KeyframeValue::Number(0.7)));
    }

    #[test]
    fn non_numeric_values_step() {
        let track = vec![
            Keyframe::new(0.0, true),
            Keyframe::new(1.0, false),
        ];
        assert_eq!(sample_keyframes(&track, 0.99), Some(KeyframeValue::Bool(true)));
        assert_eq!(sample_keyframes(&track, 1.0), Some(KeyframeValue::Bool(false)));
    }

    #[test]
    fn empty_camera_track_sits_at_the_origin() {
        let cam = sample_camera(&[], 3.0);
        assert_eq!(cam.position, plica_geometry_core::Vec3::ZERO);
        assert_eq!(cam.spherical, None);
    }
}
