//! Mechanical repair of a fixed set of script defects.
//!
//! The repairer works on a clone of the script and only touches:
//! - camera presets that are not in the preset set (replaced with `isometric`),
//! - full-camera elevations outside `[0, 90]` (clamped),
//! - scene ids already used by an earlier scene (suffixed),
//! - creation actions with a blank id (synthesized from what they reference),
//! - creation actions whose id was already used earlier in the script (suffixed).
//!
//! An input error is only dropped when a fix was applied at its path; everything
//! else is passed through untouched. A repaired script is not guaranteed to be
//! valid; run the [`Validator`](crate::Validator) again.

use hashbrown::HashSet;
use plica_geometry_core::GeometricModel;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::Action;
use crate::camera::{CameraConfig, CameraPreset};
use crate::diagnostics::{ErrorKind, ValidationError};
use crate::script::SceneScript;

/// One change made by the repairer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixApplied {
    pub error_type: ErrorKind,
    pub path: String,
    pub original: Value,
    pub fixed: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairOutcome {
    /// True when none of the input errors was left unrepaired.
    pub fixed: bool,
    /// The patched clone; `None` when no input error was repairable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<SceneScript>,
    pub remaining_errors: Vec<ValidationError>,
    pub fixes: Vec<FixApplied>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AutoRepairer;

impl AutoRepairer {
    pub fn new() -> Self {
        Self
    }

    /// Repair `script` given the errors a validation run against `model` reported.
    ///
    /// Every repair is derived from the script alone; `model` is accepted so the
    /// call mirrors [`Validator::validate`](crate::Validator::validate).
    pub fn repair(
        &self,
        script: &SceneScript,
        errors: &[ValidationError],
        _model: &GeometricModel,
    ) -> RepairOutcome {
        if !errors.iter().any(|e| e.kind.is_repairable()) {
            return RepairOutcome {
                fixed: false,
                script: None,
                remaining_errors: errors.to_vec(),
                fixes: Vec::new(),
            };
        }

        let mut patched = script.clone();
        let mut fixes = Vec::new();
        repair_cameras(&mut patched, &mut fixes);
        repair_scene_ids(&mut patched, &mut fixes);

        let mut ids = IdScope {
            seen: HashSet::new(),
            fixes: &mut fixes,
        };
        for (i, scene) in patched.scenes.iter_mut().enumerate() {
            ids.repair_actions(&mut scene.actions, &format!("scenes[{i}].actions"));
        }

        for fix in &fixes {
            log::info!(
                "auto-repair {} at {}: {} -> {}",
                fix.error_type.as_str(),
                fix.path,
                fix.original,
                fix.fixed
            );
        }

        let remaining: Vec<ValidationError> = errors
            .iter()
            .filter(|e| {
                !fixes
                    .iter()
                    .any(|f| f.error_type == e.kind && f.path == e.path)
            })
            .cloned()
            .collect();

        RepairOutcome {
            fixed: remaining.is_empty(),
            script: Some(patched),
            remaining_errors: remaining,
            fixes,
        }
    }
}

fn repair_cameras(script: &mut SceneScript, fixes: &mut Vec<FixApplied>) {
    for (i, scene) in script.scenes.iter_mut().enumerate() {
        let path = format!("scenes[{i}].camera");
        match &mut scene.camera {
            CameraConfig::Preset(name) if CameraPreset::parse(name).is_none() => {
                let replacement = CameraPreset::FALLBACK.as_str();
                fixes.push(FixApplied {
                    error_type: ErrorKind::InvalidPreset,
                    path,
                    original: Value::from(name.as_str()),
                    fixed: Value::from(replacement),
                });
                *name = replacement.to_string();
            }
            CameraConfig::Full(full) => {
                let phi = full.spherical.phi;
                if phi < 0.0 || phi > 90.0 {
                    let clamped = phi.clamp(0.0, 90.0);
                    fixes.push(FixApplied {
                        error_type: ErrorKind::InvalidPhi,
                        path: format!("{path}.spherical.phi"),
                        original: Value::from(phi),
                        fixed: Value::from(clamped),
                    });
                    full.spherical.phi = clamped;
                }
            }
            _ => {}
        }
    }
}

fn repair_scene_ids(script: &mut SceneScript, fixes: &mut Vec<FixApplied>) {
    let mut seen: HashSet<String> = HashSet::new();
    for (i, scene) in script.scenes.iter_mut().enumerate() {
        if seen.insert(scene.id.clone()) {
            continue;
        }
        let unique = first_free(&seen, &scene.id);
        fixes.push(FixApplied {
            error_type: ErrorKind::DuplicateId,
            path: format!("scenes[{i}].id"),
            original: Value::from(scene.id.as_str()),
            fixed: Value::from(unique.as_str()),
        });
        seen.insert(unique.clone());
        scene.id = unique;
    }
}

/// `base`, or `base_N` with the smallest `N >= 2` not in `seen`.
fn first_free(seen: &HashSet<String>, base: &str) -> String {
    if !seen.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !seen.contains(candidate.as_str()))
        .unwrap_or_else(|| base.to_string())
}

/// Element ids seen so far across the whole script.
struct IdScope<'f> {
    seen: HashSet<String>,
    fixes: &'f mut Vec<FixApplied>,
}

impl IdScope<'_> {
    fn repair_actions(&mut self, actions: &mut [Action], base: &str) {
        for (i, action) in actions.iter_mut().enumerate() {
            let path = format!("{base}[{i}]");
            if let Action::Together(group) = action {
                self.repair_actions(&mut group.actions, &format!("{path}.actions"));
                continue;
            }
            if let Action::Unrecognized(raw) = action {
                // A malformed creation still claims its id for later siblings.
                let creation = raw.malformed_kind().is_some_and(|k| k.is_creation());
                if let Some(id) = raw.str_field("id").filter(|_| creation) {
                    self.seen.insert(id.to_string());
                }
                continue;
            }

            let generated = synthesized_id(action);
            let Some(slot) = action.created_id_mut() else {
                continue;
            };
            let id_path = format!("{path}.id");
            match slot.as_deref() {
                Some(id) if !id.trim().is_empty() && !self.seen.contains(id) => {
                    self.seen.insert(id.to_string());
                }
                Some(id) if !id.trim().is_empty() => {
                    let unique = self.unique(id);
                    self.record(ErrorKind::DuplicateId, id_path, Value::from(id), &unique);
                    *slot = Some(unique);
                }
                blank => {
                    let original = blank.map_or(Value::Null, Value::from);
                    let unique = self.unique(&generated);
                    self.record(ErrorKind::MissingId, id_path, original, &unique);
                    *slot = Some(unique);
                }
            }
        }
    }

    fn unique(&self, base: &str) -> String {
        first_free(&self.seen, base)
    }

    fn record(&mut self, kind: ErrorKind, path: String, original: Value, fixed: &str) {
        self.seen.insert(fixed.to_string());
        self.fixes.push(FixApplied {
            error_type: kind,
            path,
            original,
            fixed: Value::from(fixed),
        });
    }
}

/// Deterministic id for a creation action, built from the points it references.
fn synthesized_id(action: &Action) -> String {
    match action {
        Action::DrawLine(a) => format!("line_{}_{}", a.from.trim(), a.to.trim()),
        Action::ShowPath(a) => format!("path_{}_{}", a.from.trim(), a.to.trim()),
        Action::ShowPlane(a) => format!("plane_{}", a.points.join("_")),
        Action::ShowTetrahedron(a) => format!("tetrahedron_{}", a.vertices.join("_")),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_appends_the_first_free_suffix() {
        let mut fixes = Vec::new();
        let mut scope = IdScope {
            seen: HashSet::new(),
            fixes: &mut fixes,
        };
        scope.seen.insert("line_A_B".into());
        scope.seen.insert("line_A_B_2".into());
        assert_eq!(scope.unique("line_A_B"), "line_A_B_3");
        assert_eq!(scope.unique("line_B_C"), "line_B_C");
    }
}
