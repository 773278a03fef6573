//! Camera math shared by the compiler and the player.

use plica_geometry_core::{Vec3, CENTER};
use plica_script_core::{CameraConfig, CameraPreset, Spherical, Transition};

/// Cartesian eye position for a spherical pose (degrees), y up.
pub fn spherical_to_cartesian(s: Spherical) -> Vec3 {
    let theta = s.theta.to_radians();
    let phi = s.phi.to_radians();
    Vec3::new(
        s.radius * phi.cos() * theta.cos(),
        s.radius * phi.sin(),
        s.radius * phi.cos() * theta.sin(),
    )
}

/// A scene camera with presets expanded.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedCamera {
    pub spherical: Spherical,
    pub look_at: String,
    pub transition: Transition,
}

impl ResolvedCamera {
    /// Expand a script camera. Unknown presets and unparseable specs fall back to
    /// the default preset.
    pub fn from_config(config: &CameraConfig) -> Self {
        let preset = match config {
            CameraConfig::Full(full) => {
                return Self {
                    spherical: full.spherical,
                    look_at: full.look_at.clone(),
                    transition: full.transition,
                }
            }
            CameraConfig::Preset(name) => CameraPreset::parse(name).unwrap_or_else(|| {
                log::warn!("unknown camera preset '{name}', using {}", CameraPreset::FALLBACK.as_str());
                CameraPreset::FALLBACK
            }),
            CameraConfig::Invalid(raw) => {
                log::warn!("unusable camera spec {raw}, using {}", CameraPreset::FALLBACK.as_str());
                CameraPreset::FALLBACK
            }
        };
        Self {
            spherical: preset.spherical(),
            look_at: CENTER.to_string(),
            transition: Transition::Ease,
        }
    }
}
