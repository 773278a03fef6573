use serde::{Deserialize, Serialize};

/// Timing knobs of the [`Compiler`](crate::Compiler).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompileConfig {
    /// Narration reading speed used for the minimum scene length.
    pub chars_per_second: f64,
    /// Trailing pad added to every scene (seconds).
    pub scene_padding: f64,
    /// How long before scene end a held highlight starts its release (seconds).
    pub highlight_release: f64,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            chars_per_second: 5.0,
            scene_padding: 0.5,
            highlight_release: 0.3,
        }
    }
}
