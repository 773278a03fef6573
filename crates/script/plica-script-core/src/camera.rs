//! Scene camera specification: a named preset or a full spherical pose.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Spherical camera pose in degrees. `theta` is the azimuth, `phi` the elevation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Spherical {
    pub radius: f64,
    pub theta: f64,
    pub phi: f64,
}

impl Spherical {
    pub fn new(radius: f64, theta: f64, phi: f64) -> Self {
        Self { radius, theta, phi }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CameraPreset {
    Front,
    Top,
    Side,
    Isometric,
    IsometricBack,
}

impl CameraPreset {
    pub const ALL: [CameraPreset; 5] = [
        CameraPreset::Front,
        CameraPreset::Top,
        CameraPreset::Side,
        CameraPreset::Isometric,
        CameraPreset::IsometricBack,
    ];

    /// Replacement for unknown preset names.
    pub const FALLBACK: CameraPreset = CameraPreset::Isometric;

    pub fn as_str(self) -> &'static str {
        match self {
            CameraPreset::Front => "front",
            CameraPreset::Top => "top",
            CameraPreset::Side => "side",
            CameraPreset::Isometric => "isometric",
            CameraPreset::IsometricBack => "isometric-back",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    pub fn spherical(self) -> Spherical {
        match self {
            CameraPreset::Front => Spherical::new(2.5, 0.0, 15.0),
            CameraPreset::Top => Spherical::new(2.5, 0.0, 85.0),
            CameraPreset::Side => Spherical::new(2.5, 90.0, 15.0),
            CameraPreset::Isometric => Spherical::new(2.5, 45.0, 35.0),
            CameraPreset::IsometricBack => Spherical::new(2.5, 225.0, 35.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transition {
    Instant,
    Ease,
    EaseInOut,
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraFull {
    pub spherical: Spherical,
    pub look_at: String,
    pub transition: Transition,
}

/// Camera of one scene as written in the script.
///
/// Unknown preset names and unparseable objects are kept so the validator can
/// report them and the repairer can replace them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CameraConfig {
    Preset(String),
    Full(CameraFull),
    Invalid(Value),
}

impl CameraConfig {
    pub fn preset(preset: CameraPreset) -> Self {
        CameraConfig::Preset(preset.as_str().to_string())
    }

    pub fn full(spherical: Spherical, look_at: impl Into<String>, transition: Transition) -> Self {
        CameraConfig::Full(CameraFull {
            spherical,
            look_at: look_at.into(),
            transition,
        })
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig::preset(CameraPreset::FALLBACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_all_camera_shapes() {
        let preset: CameraConfig = serde_json::from_value(json!("isometric-back")).unwrap();
        assert_eq!(preset, CameraConfig::preset(CameraPreset::IsometricBack));

        let full: CameraConfig = serde_json::from_value(json!({
            "spherical": {"radius": 3, "theta": 30, "phi": 40},
            "lookAt": "E",
            "transition": "ease-in-out"
        }))
        .unwrap();
        let CameraConfig::Full(full) = full else {
            panic!("expected full camera");
        };
        assert_eq!(full.transition, Transition::EaseInOut);
        assert_eq!(full.spherical.phi, 40.0);

        let odd: CameraConfig =
            serde_json::from_value(json!({"spherical": {"radius": 3}, "lookAt": "E"})).unwrap();
        assert!(matches!(odd, CameraConfig::Invalid(_)));
    }

    #[test]
    fn preset_names_round_trip() {
        for preset in CameraPreset::ALL {
            assert_eq!(CameraPreset::parse(preset.as_str()), Some(preset));
        }
        assert_eq!(CameraPreset::parse("diagonal"), None);
    }
}
