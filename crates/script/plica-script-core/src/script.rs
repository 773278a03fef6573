use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::camera::CameraConfig;

/// An ordered list of narrated scenes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneScript {
    #[serde(default)]
    pub title: String,
    pub scenes: Vec<Scene>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: String,
    #[serde(default)]
    pub narration: String,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_measurements: Option<Vec<String>>,
}

impl Scene {
    pub fn new(id: impl Into<String>, narration: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            narration: narration.into(),
            camera: CameraConfig::default(),
            actions: Vec::new(),
            show_measurements: None,
        }
    }

    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }
}

impl SceneScript {
    pub fn new(title: impl Into<String>, scenes: Vec<Scene>) -> Self {
        Self {
            title: title.into(),
            scenes,
        }
    }

    pub fn scene(&self, id: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == id)
    }
}
