//! Script → timeline compilation.
//!
//! Scenes are compiled in script order. Visibility, opacity, parameter values and
//! fold angles carry over from one scene to the next and are re-emitted as keyframes
//! at local time 0, so every compiled scene can be sampled on its own. Highlights
//! never carry over: whatever a scene highlights is cleared by its end.

use indexmap::{IndexMap, IndexSet};
use plica_geometry_core::{EvalContext, GeometricModel, GeometryEvaluator, Vec3};
use plica_script_core::{Action, CameraConfig, Scene, SceneScript};

use crate::camera::ResolvedCamera;
use crate::config::CompileConfig;
use crate::easing::Easing;
use crate::error::CompileError;
use crate::registry::{defaults, ElementDefinition, ElementRegistry};
use crate::timeline::{
    ActionTrack, CameraKeyframe, CompiledScene, Keyframe, KeyframeValue, Timeline, TrackProperty,
};

/// Output of a successful compile.
#[derive(Clone, Debug, PartialEq)]
pub struct CompileOutput {
    pub timeline: Timeline,
    pub registry: ElementRegistry,
}

/// State handed from the end of one scene to the start of the next.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContinuityState {
    pub visible: IndexSet<String>,
    pub opacities: IndexMap<String, f64>,
    pub params: IndexMap<String, f64>,
    pub fold_angles: IndexMap<String, f64>,
}

impl ContinuityState {
    /// State before the first scene: base vertices, declared points and fold
    /// targets are visible; parameters and folds sit at their defaults.
    pub fn initial(model: &GeometricModel) -> Self {
        let mut visible: IndexSet<String> = model
            .base
            .kind
            .vertex_ids()
            .iter()
            .map(|id| id.to_string())
            .collect();
        visible.extend(model.points.iter().map(|p| p.id.clone()));
        for fold in &model.folds {
            visible.extend(fold.folded_points.iter().cloned());
        }

        Self {
            visible,
            opacities: IndexMap::new(),
            params: model
                .params
                .iter()
                .map(|p| (p.id.clone(), p.default_value))
                .collect(),
            fold_angles: model
                .folds
                .iter()
                .map(|f| (f.id.clone(), model.initial_fold_angle(f)))
                .collect(),
        }
    }

    pub fn eval_context(&self) -> EvalContext {
        EvalContext {
            params: self.params.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            fold_angles: self.fold_angles.iter().map(|(k, v)| (k.clone(), *v)).collect(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Compiler {
    config: CompileConfig,
}

impl Compiler {
    pub fn new(config: CompileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    /// Compile `script` against `model`. Scenes are laid out back to back from t = 0.
    pub fn compile(
        &self,
        script: &SceneScript,
        model: &GeometricModel,
    ) -> Result<CompileOutput, CompileError> {
        let evaluator = GeometryEvaluator::new(model)?;
        let mut state = ContinuityState::initial(model);
        let mut registry = ElementRegistry::new();
        let mut scenes = Vec::with_capacity(script.scenes.len());
        let mut cursor = 0.0;

        for scene in &script.scenes {
            let (compiled, next) =
                self.compile_scene(scene, cursor, model, &evaluator, state, &mut registry)?;
            state = next;
            cursor = compiled.end_time;
            scenes.push(compiled);
        }

        Ok(CompileOutput {
            timeline: Timeline {
                duration: cursor,
                scenes,
            },
            registry,
        })
    }

    /// Compile one scene starting at global time `start` from the state the
    /// previous scene ended in. Returns the scene and the state it ends in; new
    /// elements are added to `registry`.
    pub fn compile_scene(
        &self,
        scene: &Scene,
        start: f64,
        model: &GeometricModel,
        evaluator: &GeometryEvaluator,
        state: ContinuityState,
        registry: &mut ElementRegistry,
    ) -> Result<(CompiledScene, ContinuityState), CompileError> {
        let mut state = state;
        let mut builder = SceneBuilder {
            scene_id: &scene.id,
            model,
            state: &mut state,
            registry,
            tracks: IndexMap::new(),
            held_highlights: IndexMap::new(),
        };
        builder.emit_inherited();

        let camera_track = vec![builder.camera_keyframe(&scene.camera, evaluator)?];

        let mut local = 0.0;
        for action in &scene.actions {
            local += builder.compile_action(action, local)?;
        }

        let reading = if self.config.chars_per_second > 0.0 {
            scene.narration.chars().count() as f64 / self.config.chars_per_second
        } else {
            0.0
        };
        let duration = reading.max(local) + self.config.scene_padding;
        builder.release_highlights(duration, self.config.highlight_release);

        let action_tracks = builder.into_tracks();
        log::debug!(
            "compiled scene '{}': {:.2}s, {} tracks",
            scene.id,
            duration,
            action_tracks.len()
        );

        let compiled = CompiledScene {
            id: scene.id.clone(),
            start_time: start,
            end_time: start + duration,
            narration: scene.narration.clone(),
            active_measurements: scene.show_measurements.clone().unwrap_or_default(),
            camera_track,
            action_tracks,
        };
        Ok((compiled, state))
    }
}

type TrackMap = IndexMap<(TrackProperty, String), Vec<Keyframe>>;

fn push_keyframe(tracks: &mut TrackMap, property: TrackProperty, target: &str, keyframe: Keyframe) {
    tracks
        .entry((property, target.to_string()))
        .or_default()
        .push(keyframe);
}

/// Per-scene working set: the tracks being written plus the highlights that
/// still need releasing.
struct SceneBuilder<'a> {
    scene_id: &'a str,
    model: &'a GeometricModel,
    state: &'a mut ContinuityState,
    registry: &'a mut ElementRegistry,
    tracks: TrackMap,
    held_highlights: IndexMap<String, String>,
}

impl SceneBuilder<'_> {
    fn push(&mut self, property: TrackProperty, target: &str, keyframe: Keyframe) {
        push_keyframe(&mut self.tracks, property, target, keyframe);
    }

    fn emit_inherited(&mut self) {
        let state = &*self.state;
        let tracks = &mut self.tracks;
        for id in &state.visible {
            push_keyframe(tracks, TrackProperty::Visibility, id, Keyframe::new(0.0, true));
        }
        for (id, value) in &state.opacities {
            push_keyframe(tracks, TrackProperty::Opacity, id, Keyframe::new(0.0, *value));
        }
        for (id, value) in &state.params {
            push_keyframe(tracks, TrackProperty::Param, id, Keyframe::new(0.0, *value));
        }
        for (id, value) in &state.fold_angles {
            push_keyframe(tracks, TrackProperty::Fold, id, Keyframe::new(0.0, *value));
        }
    }

    /// Single camera keyframe at local time 0. The look-at target is resolved with
    /// the parameter and fold state of the scene start.
    fn camera_keyframe(
        &self,
        camera: &CameraConfig,
        evaluator: &GeometryEvaluator,
    ) -> Result<CameraKeyframe, CompileError> {
        let resolved = ResolvedCamera::from_config(camera);
        let ctx = self.state.eval_context();
        let look_at = match self.registry.get(&resolved.look_at) {
            Some(element) => {
                let anchors = element.resolve(evaluator, Some(&ctx))?;
                Vec3::centroid(&anchors).unwrap_or(Vec3::ZERO)
            }
            None => evaluator.point_coord(&resolved.look_at, Some(&ctx))?,
        };
        Ok(CameraKeyframe {
            time: 0.0,
            spherical: resolved.spherical,
            look_at,
            easing: Easing::for_transition(resolved.transition),
        })
    }

    fn element_id(&self, id: &Option<String>, action: &'static str) -> Result<String, CompileError> {
        match id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => Ok(id.to_string()),
            _ => Err(CompileError::MissingElementId {
                scene: self.scene_id.to_string(),
                action,
            }),
        }
    }

    /// Write the keyframes of `action` starting at local time `start` and return the
    /// time it occupies on the cursor.
    fn compile_action(&mut self, action: &Action, start: f64) -> Result<f64, CompileError> {
        let duration = action.nominal_duration();
        let end = start + duration;

        match action {
            Action::Show(a) => {
                self.push(TrackProperty::Visibility, &a.target, Keyframe::new(end, true));
                self.state.visible.insert(a.target.clone());
            }
            Action::Hide(a) => {
                self.push(TrackProperty::Visibility, &a.target, Keyframe::new(end, false));
                self.state.visible.shift_remove(&a.target);
            }
            Action::FadeIn(a) => {
                self.push(TrackProperty::Visibility, &a.target, Keyframe::new(start, true));
                self.push(TrackProperty::Opacity, &a.target, Keyframe::new(start, 0.0));
                self.push(
                    TrackProperty::Opacity,
                    &a.target,
                    Keyframe::eased(end, 1.0, Easing::EaseInOut),
                );
                self.state.visible.insert(a.target.clone());
                self.state.opacities.insert(a.target.clone(), 1.0);
            }
            Action::FadeOut(a) => {
                let from = self.state.opacities.get(&a.target).copied().unwrap_or(1.0);
                self.push(TrackProperty::Opacity, &a.target, Keyframe::new(start, from));
                self.push(
                    TrackProperty::Opacity,
                    &a.target,
                    Keyframe::eased(end, 0.0, Easing::EaseInOut),
                );
                self.push(TrackProperty::Visibility, &a.target, Keyframe::new(end, false));
                self.state.visible.shift_remove(&a.target);
                self.state.opacities.insert(a.target.clone(), 0.0);
            }
            Action::Highlight(a) => {
                let color = a
                    .color
                    .clone()
                    .unwrap_or_else(|| defaults::HIGHLIGHT_COLOR.to_string());
                self.push(
                    TrackProperty::Highlight,
                    &a.target,
                    Keyframe::new(start, KeyframeValue::Color(color.clone())),
                );
                self.held_highlights.insert(a.target.clone(), color);
            }
            Action::Pulse(a) => {
                let color = a.color.as_deref().unwrap_or(defaults::HIGHLIGHT_COLOR);
                let steps = a.repetitions().saturating_mul(2);
                let segment = duration / f64::from(steps);
                for i in 0..steps {
                    let value = if i % 2 == 0 {
                        KeyframeValue::Color(color.to_string())
                    } else {
                        KeyframeValue::Null
                    };
                    let time = start + f64::from(i) * segment;
                    self.push(TrackProperty::Highlight, &a.target, Keyframe::new(time, value));
                }
                self.push(
                    TrackProperty::Highlight,
                    &a.target,
                    Keyframe::new(end, KeyframeValue::Null),
                );
            }
            Action::DrawLine(a) => {
                let id = self.element_id(&a.id, "drawLine")?;
                self.registry.insert(ElementDefinition::Line {
                    id: id.clone(),
                    from: a.from.clone(),
                    to: a.to.clone(),
                    style: a.style.unwrap_or_default(),
                    color: a.color.clone().unwrap_or_else(|| defaults::LINE_COLOR.into()),
                });
                self.reveal(&id, end, None);
            }
            Action::ShowPath(a) => {
                let id = self.element_id(&a.id, "showPath")?;
                self.registry.insert(ElementDefinition::Path {
                    id: id.clone(),
                    from: a.from.clone(),
                    to: a.to.clone(),
                    color: a.color.clone().unwrap_or_else(|| defaults::PATH_COLOR.into()),
                });
                self.reveal(&id, end, None);
            }
            Action::ShowPlane(a) => {
                let id = self.element_id(&a.id, "showPlane")?;
                let opacity = a.opacity.unwrap_or(defaults::PLANE_OPACITY);
                self.registry.insert(ElementDefinition::Plane {
                    id: id.clone(),
                    points: a.points.clone(),
                    color: a.color.clone().unwrap_or_else(|| defaults::PLANE_COLOR.into()),
                    opacity,
                });
                self.reveal(&id, end, Some(opacity));
            }
            Action::ShowTetrahedron(a) => {
                let id = self.element_id(&a.id, "showTetrahedron")?;
                let opacity = a.opacity.unwrap_or(defaults::TETRAHEDRON_OPACITY);
                self.registry.insert(ElementDefinition::Tetrahedron {
                    id: id.clone(),
                    vertices: a.vertices.clone(),
                    color: a
                        .color
                        .clone()
                        .unwrap_or_else(|| defaults::TETRAHEDRON_COLOR.into()),
                    opacity,
                });
                self.reveal(&id, end, Some(opacity));
            }
            Action::AnimatePoint(a) => {
                let param = self
                    .model
                    .driving_param(&a.target)
                    .ok_or_else(|| CompileError::MissingDrivingParameter {
                        scene: self.scene_id.to_string(),
                        point: a.target.clone(),
                    })?
                    .to_string();
                self.push(TrackProperty::Param, &param, Keyframe::new(start, a.from));
                self.push(
                    TrackProperty::Param,
                    &param,
                    Keyframe::eased(end, a.to, Easing::Linear),
                );
                self.state.params.insert(param, a.to);
            }
            Action::Fold(a) => {
                let to = a.end_angle();
                self.push(TrackProperty::Fold, &a.fold_id, Keyframe::new(start, a.start_angle()));
                self.push(
                    TrackProperty::Fold,
                    &a.fold_id,
                    Keyframe::eased(end, to, Easing::Linear),
                );
                self.state.fold_angles.insert(a.fold_id.clone(), to);
            }
            Action::Together(group) => {
                for child in &group.actions {
                    self.compile_action(child, start)?;
                }
            }
            Action::Wait(_) => {}
            Action::Unrecognized(raw) => {
                log::warn!(
                    "scene '{}': skipping unrecognized action {}",
                    self.scene_id,
                    raw.raw
                );
            }
        }
        Ok(duration)
    }

    fn reveal(&mut self, id: &str, at: f64, opacity: Option<f64>) {
        self.push(TrackProperty::Visibility, id, Keyframe::new(at, true));
        self.state.visible.insert(id.to_string());
        if let Some(opacity) = opacity {
            self.push(TrackProperty::Opacity, id, Keyframe::new(at, opacity));
            self.state.opacities.insert(id.to_string(), opacity);
        }
    }

    /// Hold every scene highlight until shortly before the end, then clear it at
    /// the end.
    fn release_highlights(&mut self, duration: f64, release: f64) {
        let held = std::mem::take(&mut self.held_highlights);
        for (target, color) in held {
            self.push(
                TrackProperty::Highlight,
                &target,
                Keyframe::new((duration - release).max(0.0), KeyframeValue::Color(color)),
            );
            self.push(
                TrackProperty::Highlight,
                &target,
                Keyframe::new(duration, KeyframeValue::Null),
            );
        }
    }

    fn into_tracks(self) -> Vec<ActionTrack> {
        self.tracks
            .into_iter()
            .map(|((property, target_id), mut keyframes)| {
                keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
                ActionTrack {
                    target_id,
                    property,
                    keyframes,
                }
            })
            .collect()
    }
}
