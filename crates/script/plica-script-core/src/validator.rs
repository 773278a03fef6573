//! Structural and referential checks of a scene script against a geometric model.
//!
//! Actions are checked in document order with one running set of created element
//! ids for the whole script, so an element is only a valid reference after the
//! action that creates it (including creations nested in earlier `together`
//! groups, and creations in earlier scenes).

use hashbrown::HashSet;
use plica_geometry_core::{GeometricModel, CENTER};

use crate::action::{Action, ActionKind, PulseAction, RawAction, RawIssue};
use crate::camera::{CameraConfig, CameraPreset};
use crate::config::ValidatorConfig;
use crate::diagnostics::{
    ErrorKind, ValidationError, ValidationReport, ValidationWarning, WarningKind,
};
use crate::script::SceneScript;

/// Targets provided by the renderer itself.
pub const BUILTIN_TARGETS: [&str; 2] = ["geometry", "vertexLabels"];

/// Ids a script may refer to, collected once per model.
#[derive(Clone, Debug, Default)]
pub struct References {
    /// Base vertices, declared points and every id named by a fold.
    pub points: HashSet<String>,
    pub folds: HashSet<String>,
    pub measurements: HashSet<String>,
}

impl References {
    pub fn from_model(model: &GeometricModel) -> Self {
        let mut points: HashSet<String> = model
            .base
            .kind
            .vertex_ids()
            .iter()
            .map(|v| v.to_string())
            .collect();
        points.extend(model.points.iter().map(|p| p.id.clone()));
        for fold in &model.folds {
            points.extend(fold.folded_points.iter().cloned());
            points.extend(fold.moving_points.iter().cloned());
            points.extend(fold.hinge.iter().cloned());
        }
        points.insert(CENTER.to_string());

        Self {
            points,
            folds: model.folds.iter().map(|f| f.id.clone()).collect(),
            measurements: model.measurements.iter().map(|m| m.id.clone()).collect(),
        }
    }

    pub fn is_point(&self, id: &str) -> bool {
        id == CENTER || self.points.contains(id)
    }
}

/// State threaded through every action list of one validation run.
#[derive(Debug)]
pub struct ActionScope<'r> {
    refs: &'r References,
    created: HashSet<String>,
    errors: Vec<ValidationError>,
}

impl<'r> ActionScope<'r> {
    pub fn new(refs: &'r References) -> Self {
        Self {
            refs,
            created: HashSet::new(),
            errors: Vec::new(),
        }
    }

    /// Element ids created so far.
    pub fn created(&self) -> &HashSet<String> {
        &self.created
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    fn error(&mut self, kind: ErrorKind, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationError::new(kind, path, message));
    }

    fn is_target(&self, id: &str) -> bool {
        BUILTIN_TARGETS.contains(&id) || self.refs.is_point(id) || self.created.contains(id)
    }

    fn check_target(&mut self, target: &str, path: &str) {
        if !self.is_target(target) {
            self.error(
                ErrorKind::MissingReference,
                format!("{path}.target"),
                format!("target '{target}' is neither a point nor a created element"),
            );
        }
    }

    fn check_point(&mut self, id: &str, path: String) {
        if !self.refs.is_point(id) {
            self.error(
                ErrorKind::MissingReference,
                path,
                format!("unknown point '{id}'"),
            );
        }
    }

    fn check_points(&mut self, ids: &[String], path: &str, field: &str) {
        for (j, id) in ids.iter().enumerate() {
            self.check_point(id, format!("{path}.{field}[{j}]"));
        }
    }

    fn check_duration(&mut self, duration: Option<f64>, path: &str) {
        if let Some(d) = duration.filter(|d| *d < 0.0) {
            self.error(
                ErrorKind::InvalidRange,
                format!("{path}.duration"),
                format!("duration must not be negative, got {d}"),
            );
        }
    }

    /// Record the id of a creation action.
    fn register(&mut self, id: Option<&str>, kind: ActionKind, path: &str) {
        let id_path = format!("{path}.id");
        match id.filter(|id| !id.trim().is_empty()) {
            None => self.error(
                ErrorKind::MissingId,
                id_path,
                format!("{} must name the element it creates", kind.as_str()),
            ),
            Some(id) if self.created.contains(id) => self.error(
                ErrorKind::DuplicateId,
                id_path,
                format!("element id '{id}' is already in use"),
            ),
            Some(id) => {
                self.created.insert(id.to_string());
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Check `script` against `model`. Never fails; problems are reported as values.
    pub fn validate(&self, script: &SceneScript, model: &GeometricModel) -> ValidationReport {
        let refs = References::from_model(model);
        let mut scope = ActionScope::new(&refs);
        let mut warnings = Vec::new();
        let mut scene_ids: HashSet<&str> = HashSet::new();

        for (i, scene) in script.scenes.iter().enumerate() {
            let path = format!("scenes[{i}]");

            if !scene_ids.insert(scene.id.as_str()) {
                scope.error(
                    ErrorKind::DuplicateId,
                    format!("{path}.id"),
                    format!("scene id '{}' is already in use", scene.id),
                );
            }

            if scene.narration.trim().is_empty() {
                warnings.push(ValidationWarning::new(
                    WarningKind::MissingNarration,
                    format!("{path}.narration"),
                    "scene has no narration",
                ));
            }

            self.validate_camera(&scene.camera, &format!("{path}.camera"), &mut scope, &mut warnings);

            if let Some(ids) = &scene.show_measurements {
                for (j, id) in ids.iter().enumerate() {
                    if !refs.measurements.contains(id.as_str()) {
                        scope.error(
                            ErrorKind::MissingReference,
                            format!("{path}.showMeasurements[{j}]"),
                            format!("unknown measurement '{id}'"),
                        );
                    }
                }
            }

            self.validate_actions(&scene.actions, &format!("{path}.actions"), &mut scope);

            let estimated: f64 = scene.actions.iter().map(Action::nominal_duration).sum();
            if estimated > self.config.long_scene_threshold {
                warnings.push(ValidationWarning::new(
                    WarningKind::LongScene,
                    path,
                    format!("scene runs about {estimated:.1}s"),
                ));
            }
        }

        let report = ValidationReport::from_parts(scope.into_errors(), warnings);
        log::debug!(
            "validated script '{}': {} scenes, {} errors, {} warnings",
            script.title,
            script.scenes.len(),
            report.errors.len(),
            report.warnings.len()
        );
        report
    }

    fn validate_camera(
        &self,
        camera: &CameraConfig,
        path: &str,
        scope: &mut ActionScope<'_>,
        warnings: &mut Vec<ValidationWarning>,
    ) {
        let full = match camera {
            CameraConfig::Preset(name) => {
                if CameraPreset::parse(name).is_none() {
                    scope.error(
                        ErrorKind::InvalidPreset,
                        path,
                        format!("unknown camera preset '{name}'"),
                    );
                }
                return;
            }
            CameraConfig::Invalid(_) => {
                scope.error(
                    ErrorKind::InvalidCamera,
                    path,
                    "camera must be a preset name or {spherical, lookAt, transition}",
                );
                return;
            }
            CameraConfig::Full(full) => full,
        };

        let phi = full.spherical.phi;
        let phi_path = format!("{path}.spherical.phi");
        let margin = self.config.phi_edge_margin;
        if !phi.is_finite() {
            scope.error(ErrorKind::InvalidCamera, phi_path, "phi must be a finite number");
        } else if !(0.0..=90.0).contains(&phi) {
            scope.error(
                ErrorKind::InvalidPhi,
                phi_path,
                format!("phi {phi} is outside [0, 90]"),
            );
        } else if phi <= margin || phi >= 90.0 - margin {
            warnings.push(ValidationWarning::new(
                WarningKind::PhiEdgeValue,
                phi_path,
                format!("phi {phi} is close to the edge of [0, 90]"),
            ));
        }

        let look_at = full.look_at.as_str();
        if !scope.refs.is_point(look_at) && !scope.created.contains(look_at) {
            scope.error(
                ErrorKind::MissingReference,
                format!("{path}.lookAt"),
                format!("lookAt '{look_at}' is neither a point nor a created element"),
            );
        }
    }

    /// Check one action list, recursing into `together` groups in document order.
    pub fn validate_actions(&self, actions: &[Action], base: &str, scope: &mut ActionScope<'_>) {
        for (i, action) in actions.iter().enumerate() {
            let path = format!("{base}[{i}]");
            match action {
                Action::Show(a) | Action::Hide(a) => scope.check_target(&a.target, &path),
                Action::FadeIn(a) | Action::FadeOut(a) => {
                    scope.check_target(&a.target, &path);
                    scope.check_duration(a.duration, &path);
                }
                Action::Highlight(a) => scope.check_target(&a.target, &path),
                Action::Pulse(a) => {
                    scope.check_target(&a.target, &path);
                    let max = f64::from(PulseAction::MAX_REPETITIONS);
                    if let Some(times) = a.times.filter(|t| *t > max) {
                        scope.error(
                            ErrorKind::InvalidRange,
                            format!("{path}.times"),
                            format!("pulse times {times} exceeds {max}"),
                        );
                    }
                }
                Action::DrawLine(a) => {
                    scope.register(a.id.as_deref(), ActionKind::DrawLine, &path);
                    scope.check_point(&a.from, format!("{path}.from"));
                    scope.check_point(&a.to, format!("{path}.to"));
                }
                Action::ShowPath(a) => {
                    scope.register(a.id.as_deref(), ActionKind::ShowPath, &path);
                    scope.check_point(&a.from, format!("{path}.from"));
                    scope.check_point(&a.to, format!("{path}.to"));
                }
                Action::ShowPlane(a) => {
                    scope.register(a.id.as_deref(), ActionKind::ShowPlane, &path);
                    if a.points.len() < 3 {
                        scope.error(
                            ErrorKind::MissingReference,
                            format!("{path}.points"),
                            format!("showPlane needs at least 3 points, got {}", a.points.len()),
                        );
                    } else {
                        scope.check_points(&a.points, &path, "points");
                    }
                }
                Action::ShowTetrahedron(a) => {
                    scope.register(a.id.as_deref(), ActionKind::ShowTetrahedron, &path);
                    if a.vertices.len() != 4 {
                        scope.error(
                            ErrorKind::MissingReference,
                            format!("{path}.vertices"),
                            format!("showTetrahedron needs exactly 4 vertices, got {}", a.vertices.len()),
                        );
                    } else {
                        scope.check_points(&a.vertices, &path, "vertices");
                    }
                }
                Action::AnimatePoint(a) => {
                    if !scope.refs.is_point(&a.target) {
                        scope.error(
                            ErrorKind::MissingReference,
                            format!("{path}.target"),
                            format!("animatePoint targets unknown point '{}'", a.target),
                        );
                    }
                    let unit = 0.0..=1.0;
                    if !unit.contains(&a.from) || !unit.contains(&a.to) {
                        scope.error(
                            ErrorKind::InvalidRange,
                            format!("{path}.from"),
                            format!("animatePoint range must lie in [0, 1], got {} -> {}", a.from, a.to),
                        );
                    }
                    scope.check_duration(a.duration, &path);
                }
                Action::Fold(a) => {
                    if !scope.refs.folds.contains(a.fold_id.as_str()) {
                        scope.error(
                            ErrorKind::InvalidFoldId,
                            format!("{path}.foldId"),
                            format!("unknown fold '{}'", a.fold_id),
                        );
                    }
                    scope.check_duration(a.duration, &path);
                }
                Action::Together(group) => {
                    self.validate_actions(&group.actions, &format!("{path}.actions"), scope)
                }
                Action::Wait(a) => scope.check_duration(Some(a.duration), &path),
                Action::Unrecognized(raw) => self.validate_raw(raw, &path, scope),
            }
        }
    }

    fn validate_raw(&self, raw: &RawAction, path: &str, scope: &mut ActionScope<'_>) {
        let (kind, detail) = match &raw.issue {
            RawIssue::MissingKind => {
                scope.error(ErrorKind::UnknownAction, path, "action has no `do` kind");
                return;
            }
            RawIssue::UnknownKind(name) => {
                scope.error(
                    ErrorKind::UnknownAction,
                    format!("{path}.do"),
                    format!("unknown action kind '{name}'"),
                );
                return;
            }
            RawIssue::Malformed { kind, detail } => (*kind, detail),
        };
        let message = format!("malformed {}: {detail}", kind.as_str());

        match kind {
            k if k.is_targeted() => {
                scope.error(ErrorKind::MissingReference, format!("{path}.target"), message)
            }
            k if k.is_creation() => {
                scope.register(raw.str_field("id"), k, path);
                let at = match malformed_creation_field(raw, k) {
                    Some(field) => format!("{path}.{field}"),
                    None => path.to_string(),
                };
                scope.error(ErrorKind::MissingReference, at, message);
            }
            ActionKind::AnimatePoint => {
                if raw.str_field("target").is_none() {
                    scope.error(ErrorKind::MissingReference, format!("{path}.target"), message);
                } else {
                    scope.error(ErrorKind::InvalidRange, format!("{path}.from"), message);
                }
            }
            ActionKind::Fold => {
                scope.error(ErrorKind::InvalidFoldId, format!("{path}.foldId"), message)
            }
            ActionKind::Together => {
                scope.error(ErrorKind::UnknownAction, format!("{path}.actions"), message)
            }
            _ => scope.error(ErrorKind::UnknownAction, path, message),
        }
    }
}

/// First required field of a raw creation action that is missing or mistyped.
fn malformed_creation_field(raw: &RawAction, kind: ActionKind) -> Option<&'static str> {
    let is_id_list = |field: &str| {
        raw.raw
            .get(field)
            .and_then(|v| v.as_array())
            .is_some_and(|items| items.iter().all(|v| v.is_string()))
    };
    match kind {
        ActionKind::DrawLine | ActionKind::ShowPath => ["from", "to"]
            .into_iter()
            .find(|f| raw.str_field(f).is_none()),
        ActionKind::ShowPlane => (!is_id_list("points")).then_some("points"),
        ActionKind::ShowTetrahedron => (!is_id_list("vertices")).then_some("vertices"),
        _ => None,
    }
}
