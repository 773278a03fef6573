//! Compiled timeline: contiguous scenes, each carrying self-contained keyframe tracks.

use plica_geometry_core::Vec3;
use plica_script_core::Spherical;
use serde::{Deserialize, Serialize};

use crate::easing::Easing;

/// Value carried by a property keyframe. `Null` clears a highlight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyframeValue {
    Bool(bool),
    Number(f64),
    Color(String),
    Null,
}

impl KeyframeValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            KeyframeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            KeyframeValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<&str> {
        match self {
            KeyframeValue::Color(c) => Some(c),
            _ => None,
        }
    }
}

impl From<bool> for KeyframeValue {
    fn from(b: bool) -> Self {
        KeyframeValue::Bool(b)
    }
}

impl From<f64> for KeyframeValue {
    fn from(n: f64) -> Self {
        KeyframeValue::Number(n)
    }
}

/// A keyframe at scene-local `time` (seconds). The easing shapes the segment
/// that ends at this keyframe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f64,
    pub value: KeyframeValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<Easing>,
}

impl Keyframe {
    pub fn new(time: f64, value: impl Into<KeyframeValue>) -> Self {
        Self {
            time,
            value: value.into(),
            easing: None,
        }
    }

    pub fn eased(time: f64, value: impl Into<KeyframeValue>, easing: Easing) -> Self {
        Self {
            time,
            value: value.into(),
            easing: Some(easing),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackProperty {
    Visibility,
    Opacity,
    Highlight,
    Param,
    Fold,
}

/// Keyframes of one property of one target, sorted by time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionTrack {
    pub target_id: String,
    pub property: TrackProperty,
    pub keyframes: Vec<Keyframe>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraKeyframe {
    pub time: f64,
    pub spherical: Spherical,
    pub look_at: Vec3,
    pub easing: Easing,
}

/// One scene laid out on the global clock over `[start_time, end_time)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledScene {
    pub id: String,
    pub start_time: f64,
    pub end_time: f64,
    pub narration: String,
    pub active_measurements: Vec<String>,
    pub camera_track: Vec<CameraKeyframe>,
    pub action_tracks: Vec<ActionTrack>,
}

impl CompiledScene {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn track(&self, property: TrackProperty, target: &str) -> Option<&ActionTrack> {
        self.action_tracks
            .iter()
            .find(|t| t.property == property && t.target_id == target)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub duration: f64,
    pub scenes: Vec<CompiledScene>,
}

impl Timeline {
    /// Scene playing at global time `t` (already clamped to `[0, duration]`).
    /// `t == duration` selects the last scene.
    pub fn scene_at(&self, t: f64) -> Option<&CompiledScene> {
        let last = self.scenes.last()?;
        if t >= self.duration {
            return Some(last);
        }
        self.scenes
            .iter()
            .find(|s| t >= s.start_time && t < s.end_time)
            .or(Some(last))
    }

    pub fn scene(&self, id: &str) -> Option<&CompiledScene> {
        self.scenes.iter().find(|s| s.id == id)
    }
}
