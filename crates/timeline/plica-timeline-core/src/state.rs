//! Per-frame snapshot produced by the player.

use indexmap::{IndexMap, IndexSet};
use plica_geometry_core::{EvalContext, Vec3};
use plica_script_core::Spherical;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraState {
    pub position: Vec3,
    pub look_at: Vec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spherical: Option<Spherical>,
}

/// Everything a renderer needs to draw one frame.
///
/// Map and set equality ignores insertion order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneState {
    pub current_scene_id: String,
    pub global_time: f64,
    pub scene_local_time: f64,
    pub visible_elements: IndexSet<String>,
    pub opacities: IndexMap<String, f64>,
    pub highlights: IndexMap<String, String>,
    pub param_values: IndexMap<String, f64>,
    pub fold_angles: IndexMap<String, f64>,
    pub camera: CameraState,
    pub subtitle: String,
    pub active_measurements: Vec<String>,
}

impl SceneState {
    pub fn is_visible(&self, id: &str) -> bool {
        self.visible_elements.contains(id)
    }

    pub fn highlight(&self, id: &str) -> Option<&str> {
        self.highlights.get(id).map(String::as_str)
    }

    /// Evaluation context for the sampled parameter values and fold angles.
    pub fn eval_context(&self) -> EvalContext {
        EvalContext {
            params: self
                .param_values
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
            fold_angles: self
                .fold_angles
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
        }
    }
}
