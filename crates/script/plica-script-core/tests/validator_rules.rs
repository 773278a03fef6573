use plica_geometry_core::GeometricModel;
use plica_script_core::{
    Action, CameraConfig, CameraPreset, ErrorKind, Scene, SceneScript, Spherical, Transition,
    ValidationReport, Validator, ValidatorConfig, WarningKind,
};
use plica_test_fixtures::{models, scripts};
use serde_json::{json, Value};

fn cube() -> GeometricModel {
    models::load("cube-midpoints").expect("cube model")
}

fn actions(list: Value) -> Vec<Action> {
    serde_json::from_value(list).expect("actions")
}

fn one_scene(list: Value) -> SceneScript {
    SceneScript::new(
        "t",
        vec![Scene::new("s", "narration").with_actions(actions(list))],
    )
}

fn validate(script: &SceneScript) -> ValidationReport {
    Validator::default().validate(script, &cube())
}

fn kinds_at(report: &ValidationReport) -> Vec<(ErrorKind, &str)> {
    report
        .errors
        .iter()
        .map(|e| (e.kind, e.path.as_str()))
        .collect()
}

#[test]
fn it_should_accept_every_clean_fixture() {
    let _ = env_logger::builder().is_test(true).try_init();
    for name in ["cube-tour", "square-folding", "tetrahedron-intro"] {
        let (script, model): (SceneScript, GeometricModel) =
            scripts::load_with_model(name).unwrap();
        let report = Validator::default().validate(&script, &model);
        assert!(report.valid, "{name}: {:?}", report.errors);
        assert!(report.warnings.is_empty(), "{name}: {:?}", report.warnings);
    }
}

#[test]
fn it_should_reject_references_before_creation() {
    let script = one_scene(json!([
        { "do": "highlight", "target": "l" },
        { "do": "drawLine", "id": "l", "from": "A", "to": "B" },
        { "do": "highlight", "target": "l" }
    ]));
    let report = validate(&script);
    assert!(!report.valid);
    assert_eq!(
        kinds_at(&report),
        vec![(ErrorKind::MissingReference, "scenes[0].actions[0].target")]
    );
}

#[test]
fn it_should_see_creations_nested_in_earlier_groups() {
    let script = one_scene(json!([
        {
            "do": "together",
            "actions": [
                { "do": "showPlane", "id": "p", "points": ["A", "B", "C"] },
                { "do": "fadeIn", "target": "p" }
            ]
        },
        { "do": "pulse", "target": "p", "times": 2 }
    ]));
    assert!(validate(&script).valid);
}

#[test]
fn it_should_share_element_ids_across_scenes() {
    let mut script = one_scene(json!([
        { "do": "drawLine", "id": "l", "from": "A", "to": "B" }
    ]));
    script.scenes.push(
        Scene::new("s2", "again")
            .with_camera(CameraConfig::full(
                Spherical::new(3.0, 0.0, 30.0),
                "l",
                Transition::Ease,
            ))
            .with_actions(actions(json!([
                { "do": "hide", "target": "l" },
                { "do": "drawLine", "id": "l", "from": "C", "to": "D" }
            ]))),
    );
    let report = validate(&script);
    assert_eq!(
        kinds_at(&report),
        vec![(ErrorKind::DuplicateId, "scenes[1].actions[1].id")]
    );
}

#[test]
fn it_should_flag_missing_and_duplicate_ids() {
    let script = one_scene(json!([
        { "do": "drawLine", "from": "A", "to": "B" },
        { "do": "showPath", "id": " ", "from": "A", "to": "B" },
        { "do": "showTetrahedron", "id": "t", "vertices": ["A", "B", "C", "A1"] },
        { "do": "showPlane", "id": "t", "points": ["A", "B", "C"] }
    ]));
    let report = validate(&script);
    assert_eq!(
        kinds_at(&report),
        vec![
            (ErrorKind::MissingId, "scenes[0].actions[0].id"),
            (ErrorKind::MissingId, "scenes[0].actions[1].id"),
            (ErrorKind::DuplicateId, "scenes[0].actions[3].id"),
        ]
    );
}

#[test]
fn it_should_check_creation_geometry() {
    let script = one_scene(json!([
        { "do": "drawLine", "id": "a", "from": "A", "to": "Q" },
        { "do": "showPlane", "id": "b", "points": ["A", "B"] },
        { "do": "showTetrahedron", "id": "c", "vertices": ["A", "B", "C"] },
        { "do": "showTetrahedron", "id": "d", "vertices": ["A", "B", "center", "X"] },
        { "do": "showPath", "id": "e", "from": "A" }
    ]));
    let report = validate(&script);
    assert_eq!(
        kinds_at(&report),
        vec![
            (ErrorKind::MissingReference, "scenes[0].actions[0].to"),
            (ErrorKind::MissingReference, "scenes[0].actions[1].points"),
            (ErrorKind::MissingReference, "scenes[0].actions[2].vertices"),
            (ErrorKind::MissingReference, "scenes[0].actions[3].vertices[3]"),
            (ErrorKind::MissingReference, "scenes[0].actions[4].to"),
        ]
    );
}

#[test]
fn it_should_check_animation_ranges_and_folds() {
    let script = one_scene(json!([
        { "do": "animatePoint", "target": "P", "from": 0, "to": 1.5 },
        { "do": "animatePoint", "target": "Nope", "from": 0, "to": 1 },
        { "do": "animatePoint", "target": "P", "from": "start", "to": 1 },
        { "do": "fold", "foldId": "fold_XY", "toAngle": 90 }
    ]));
    let report = validate(&script);
    assert_eq!(
        kinds_at(&report),
        vec![
            (ErrorKind::InvalidRange, "scenes[0].actions[0].from"),
            (ErrorKind::MissingReference, "scenes[0].actions[1].target"),
            (ErrorKind::InvalidRange, "scenes[0].actions[2].from"),
            (ErrorKind::InvalidFoldId, "scenes[0].actions[3].foldId"),
        ]
    );
}

#[test]
fn it_should_reject_negative_durations_and_runaway_pulses() {
    let script = one_scene(json!([
        { "do": "fadeIn", "target": "A", "duration": -1 },
        { "do": "wait", "duration": -0.5 },
        { "do": "animatePoint", "target": "P", "from": 0, "to": 1, "duration": -2 },
        { "do": "pulse", "target": "A", "times": 3000000000u64 },
        { "do": "pulse", "target": "A", "times": 100 },
        { "do": "fadeOut", "target": "A", "duration": 0 }
    ]));
    let report = validate(&script);
    assert_eq!(
        kinds_at(&report),
        vec![
            (ErrorKind::InvalidRange, "scenes[0].actions[0].duration"),
            (ErrorKind::InvalidRange, "scenes[0].actions[1].duration"),
            (ErrorKind::InvalidRange, "scenes[0].actions[2].duration"),
            (ErrorKind::InvalidRange, "scenes[0].actions[3].times"),
        ]
    );
}

#[test]
fn it_should_reject_unknown_actions() {
    let script = one_scene(json!([
        { "do": "explode", "target": "A" },
        { "target": "A" },
        { "do": "together", "actions": "show A" },
        { "do": "together", "actions": [{ "do": "teleport" }] }
    ]));
    let report = validate(&script);
    assert_eq!(
        kinds_at(&report),
        vec![
            (ErrorKind::UnknownAction, "scenes[0].actions[0].do"),
            (ErrorKind::UnknownAction, "scenes[0].actions[1]"),
            (ErrorKind::UnknownAction, "scenes[0].actions[2].actions"),
            (ErrorKind::UnknownAction, "scenes[0].actions[3].actions[0].do"),
        ]
    );
}

#[test]
fn it_should_accept_builtin_and_sentinel_targets() {
    let script = one_scene(json!([
        { "do": "fadeIn", "target": "geometry" },
        { "do": "hide", "target": "vertexLabels" },
        { "do": "highlight", "target": "center" },
        { "do": "show", "target": "P" }
    ]));
    assert!(validate(&script).valid);
}

#[test]
fn it_should_check_camera_specs() {
    let camera = |phi: f64, look_at: &str| {
        CameraConfig::full(Spherical::new(3.0, 0.0, phi), look_at, Transition::Instant)
    };
    let script = SceneScript::new(
        "cams",
        vec![
            Scene::new("a", "x").with_camera(CameraConfig::Preset("diagonal".into())),
            Scene::new("b", "x").with_camera(camera(-10.0, "center")),
            Scene::new("c", "x").with_camera(camera(88.0, "E")),
            Scene::new("d", "x").with_camera(camera(45.0, "ghost")),
            Scene::new("e", "x").with_camera(CameraConfig::Invalid(json!({ "lookAt": "A" }))),
            Scene::new("f", "x").with_camera(camera(f64::NAN, "A")),
            Scene::new("g", "x").with_camera(CameraConfig::preset(CameraPreset::Top)),
        ],
    );
    let report = validate(&script);
    assert_eq!(
        kinds_at(&report),
        vec![
            (ErrorKind::InvalidPreset, "scenes[0].camera"),
            (ErrorKind::InvalidPhi, "scenes[1].camera.spherical.phi"),
            (ErrorKind::MissingReference, "scenes[3].camera.lookAt"),
            (ErrorKind::InvalidCamera, "scenes[4].camera"),
            (ErrorKind::InvalidCamera, "scenes[5].camera.spherical.phi"),
        ]
    );
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].kind, WarningKind::PhiEdgeValue);
    assert_eq!(report.warnings[0].path, "scenes[2].camera.spherical.phi");
}

#[test]
fn it_should_check_scene_level_fields() {
    let mut first = Scene::new("same", "");
    first.show_measurements = Some(vec!["vol_AEFG".into(), "vol_XYZ".into()]);
    let script = SceneScript::new("dup", vec![first, Scene::new("same", "text")]);
    let report = validate(&script);
    assert_eq!(
        kinds_at(&report),
        vec![
            (ErrorKind::MissingReference, "scenes[0].showMeasurements[1]"),
            (ErrorKind::DuplicateId, "scenes[1].id"),
        ]
    );
    assert!(report.has_warning(WarningKind::MissingNarration));
    assert!(!report.valid);
}

#[test]
fn it_should_warn_about_long_scenes_without_blocking() {
    let script = one_scene(json!([
        { "do": "animatePoint", "target": "P", "from": 0, "to": 1, "duration": 8 },
        {
            "do": "together",
            "actions": [
                { "do": "fold", "foldId": "nope", "duration": 1 },
                { "do": "wait", "duration": 7.5 }
            ]
        }
    ]));
    let report = validate(&script);
    assert!(report.has_warning(WarningKind::LongScene));
    assert_eq!(kinds_at(&report), vec![(ErrorKind::InvalidFoldId, "scenes[0].actions[1].actions[0].foldId")]);

    let relaxed = Validator::new(ValidatorConfig {
        long_scene_threshold: 20.0,
        ..ValidatorConfig::default()
    });
    assert!(!relaxed.validate(&script, &cube()).has_warning(WarningKind::LongScene));
}

#[test]
fn it_should_report_every_defect_in_the_defect_fixture() {
    let (script, model): (SceneScript, GeometricModel) =
        scripts::load_with_model("cube-defects").unwrap();
    let report = Validator::default().validate(&script, &model);
    assert_eq!(
        kinds_at(&report),
        vec![
            (ErrorKind::InvalidPreset, "scenes[0].camera"),
            (ErrorKind::MissingId, "scenes[0].actions[0].id"),
            (ErrorKind::InvalidPhi, "scenes[1].camera.spherical.phi"),
            (ErrorKind::DuplicateId, "scenes[1].actions[0].id"),
            (ErrorKind::MissingId, "scenes[1].actions[1].actions[0].id"),
            (ErrorKind::MissingReference, "scenes[2].actions[0].target"),
            (ErrorKind::UnknownAction, "scenes[2].actions[1].do"),
        ]
    );
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].path, "scenes[2].narration");
}
