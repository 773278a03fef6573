use serde::{Deserialize, Serialize};

/// Thresholds used by the [`Validator`](crate::Validator).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidatorConfig {
    /// Estimated scene length (seconds) above which a `long_scene` warning is raised.
    pub long_scene_threshold: f64,
    /// Distance (degrees) from either end of `[0, 90]` that earns a `phi_edge_value` warning.
    pub phi_edge_margin: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            long_scene_threshold: 15.0,
            phi_edge_margin: 5.0,
        }
    }
}
