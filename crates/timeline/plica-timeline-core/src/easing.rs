//! Easing curves applied to the normalized position between two keyframes.

use plica_script_core::Transition;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    #[default]
    Linear,
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Map `t` (clamped to `[0, 1]`) through the curve.
    pub fn apply(self, t: f64) -> f64 {
        let x = clamp01(t);
        match self {
            Easing::Linear => x,
            // `ease` shares the quadratic in-out curve.
            Easing::Ease | Easing::EaseInOut => {
                if x < 0.5 {
                    2.0 * x * x
                } else {
                    1.0 - (-2.0 * x + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseIn => x * x,
            Easing::EaseOut => 1.0 - (1.0 - x) * (1.0 - x),
        }
    }

    /// Easing of the camera keyframe written for a scene transition.
    pub fn for_transition(transition: Transition) -> Self {
        match transition {
            Transition::Instant => Easing::Linear,
            Transition::Ease | Transition::EaseInOut => Easing::EaseInOut,
            Transition::Other => Easing::Ease,
        }
    }
}

#[inline]
pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        return 0.0;
    }
    x.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn curves_hit_their_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::Ease,
            Easing::EaseIn,
            Easing::EaseOut,
            Easing::EaseInOut,
        ] {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?}");
            assert_eq!(easing.apply(1.0), 1.0, "{easing:?}");
            assert_eq!(easing.apply(-3.0), 0.0, "{easing:?}");
            assert_eq!(easing.apply(7.0), 1.0, "{easing:?}");
        }
    }

    #[test]
    fn in_out_is_symmetric_about_the_midpoint() {
        assert_relative_eq!(Easing::EaseInOut.apply(0.5), 0.5);
        assert_relative_eq!(Easing::EaseInOut.apply(0.25), 0.125);
        assert_relative_eq!(Easing::EaseInOut.apply(0.75), 0.875);
        assert_relative_eq!(Easing::EaseIn.apply(0.5), 0.25);
        assert_relative_eq!(Easing::EaseOut.apply(0.5), 0.75);
    }

    #[test]
    fn transitions_map_to_camera_easing() {
        assert_eq!(Easing::for_transition(Transition::Instant), Easing::Linear);
        assert_eq!(Easing::for_transition(Transition::Ease), Easing::EaseInOut);
        assert_eq!(Easing::for_transition(Transition::EaseInOut), Easing::EaseInOut);
        assert_eq!(Easing::for_transition(Transition::Other), Easing::Ease);
    }
}
