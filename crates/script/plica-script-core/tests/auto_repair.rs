use plica_geometry_core::GeometricModel;
use plica_script_core::{
    Action, AutoRepairer, CameraConfig, ErrorKind, Scene, SceneScript, Validator,
};
use plica_test_fixtures::{models, scripts};
use serde_json::json;

fn cube() -> GeometricModel {
    models::load("cube-midpoints").expect("cube model")
}

fn script_with(actions: serde_json::Value) -> SceneScript {
    let actions: Vec<Action> = serde_json::from_value(actions).unwrap();
    SceneScript::new("t", vec![Scene::new("s", "text").with_actions(actions)])
}

#[test]
fn it_should_synthesize_ids_from_referenced_points() {
    let script = script_with(json!([{ "do": "drawLine", "from": "A", "to": "B" }]));
    let model = cube();
    let validator = Validator::default();
    let report = validator.validate(&script, &model);
    assert!(report.has_error(ErrorKind::MissingId));

    let outcome = AutoRepairer::new().repair(&script, &report.errors, &model);
    assert!(outcome.fixed);
    let repaired = outcome.script.expect("patched script");
    let Action::DrawLine(line) = &repaired.scenes[0].actions[0] else {
        panic!("expected a line");
    };
    assert_eq!(line.id.as_deref(), Some("line_A_B"));
    assert_eq!(outcome.fixes.len(), 1);
    assert_eq!(outcome.fixes[0].path, "scenes[0].actions[0].id");
    assert_eq!(outcome.fixes[0].original, json!(null));
    assert_eq!(outcome.fixes[0].fixed, json!("line_A_B"));

    let again = validator.validate(&repaired, &model);
    assert!(!again.has_error(ErrorKind::MissingId));
    assert!(again.valid);
}

#[test]
fn it_should_never_touch_the_input() {
    let script = script_with(json!([{ "do": "showPath", "from": "A", "to": "C1" }]));
    let before = script.clone();
    let report = Validator::default().validate(&script, &cube());
    let _ = AutoRepairer::new().repair(&script, &report.errors, &cube());
    assert_eq!(script, before);
}

#[test]
fn it_should_suffix_colliding_ids_in_document_order() {
    let script = script_with(json!([
        { "do": "drawLine", "id": "line_A_B", "from": "A", "to": "B" },
        { "do": "drawLine", "from": "A", "to": "B" },
        {
            "do": "together",
            "actions": [
                { "do": "drawLine", "id": "line_A_B", "from": "A", "to": "B" },
                { "do": "showPlane", "points": ["A", "B", "C"] },
                { "do": "showTetrahedron", "id": "", "vertices": ["A", "B", "C", "A1"] }
            ]
        }
    ]));
    let report = Validator::default().validate(&script, &cube());
    let outcome = AutoRepairer::new().repair(&script, &report.errors, &cube());
    let fixed: Vec<(ErrorKind, &str, String)> = outcome
        .fixes
        .iter()
        .map(|f| (f.error_type, f.path.as_str(), f.fixed.as_str().unwrap_or_default().to_string()))
        .collect();
    assert_eq!(
        fixed,
        vec![
            (ErrorKind::MissingId, "scenes[0].actions[1].id", "line_A_B_2".to_string()),
            (ErrorKind::DuplicateId, "scenes[0].actions[2].actions[0].id", "line_A_B_3".to_string()),
            (ErrorKind::MissingId, "scenes[0].actions[2].actions[1].id", "plane_A_B_C".to_string()),
            (
                ErrorKind::MissingId,
                "scenes[0].actions[2].actions[2].id",
                "tetrahedron_A_B_C_A1".to_string()
            ),
        ]
    );
    assert_eq!(outcome.fixes[3].original, json!(""));
    let repaired = outcome.script.unwrap();
    assert!(Validator::default().validate(&repaired, &cube()).valid);
}

#[test]
fn it_should_pass_through_unrepairable_errors() {
    let script = script_with(json!([
        { "do": "highlight", "target": "ghost" },
        { "do": "fold", "foldId": "nope" }
    ]));
    let report = Validator::default().validate(&script, &cube());
    let outcome = AutoRepairer::new().repair(&script, &report.errors, &cube());
    assert!(!outcome.fixed);
    assert!(outcome.script.is_none());
    assert!(outcome.fixes.is_empty());
    assert_eq!(outcome.remaining_errors, report.errors);
}

#[test]
fn it_should_repair_the_defect_fixture() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (script, model): (SceneScript, GeometricModel) =
        scripts::load_with_model("cube-defects").unwrap();
    let validator = Validator::default();
    let report = validator.validate(&script, &model);
    let outcome = AutoRepairer::new().repair(&script, &report.errors, &model);

    assert!(!outcome.fixed, "reference and unknown-action errors remain");
    let remaining: Vec<ErrorKind> = outcome.remaining_errors.iter().map(|e| e.kind).collect();
    assert_eq!(remaining, vec![ErrorKind::MissingReference, ErrorKind::UnknownAction]);
    assert_eq!(outcome.fixes.len(), 5);

    let repaired = outcome.script.expect("patched script");
    assert_eq!(repaired.scenes[0].camera, CameraConfig::Preset("isometric".into()));
    let CameraConfig::Full(full) = &repaired.scenes[1].camera else {
        panic!("full camera expected");
    };
    assert_eq!(full.spherical.phi, 90.0);

    let again = validator.validate(&repaired, &model);
    let kinds: Vec<ErrorKind> = again.errors.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![ErrorKind::MissingReference, ErrorKind::UnknownAction]);
    assert!(again
        .warnings
        .iter()
        .any(|w| w.path == "scenes[1].camera.spherical.phi"));

    // The repaired script still serializes to the wire shape, unknown action included.
    let wire = serde_json::to_value(&repaired).unwrap();
    assert_eq!(wire["scenes"][2]["actions"][1]["do"], json!("sparkle"));
    assert_eq!(wire["scenes"][1]["actions"][0]["id"], json!("l1_2"));
}

#[test]
fn it_should_rename_duplicate_scene_ids() {
    let model = cube();
    let script = SceneScript::new(
        "t",
        vec![
            Scene::new("s", "one"),
            Scene::new("s", "two"),
            Scene::new("s_2", "three"),
        ],
    );
    let validator = Validator::default();
    let report = validator.validate(&script, &model);
    let at: Vec<&str> = report.errors.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(at, vec!["scenes[1].id"]);

    let outcome = AutoRepairer::new().repair(&script, &report.errors, &model);
    assert!(outcome.fixed);
    assert!(outcome.remaining_errors.is_empty());
    let renamed: Vec<(&str, &serde_json::Value)> =
        outcome.fixes.iter().map(|f| (f.path.as_str(), &f.fixed)).collect();
    assert_eq!(
        renamed,
        vec![("scenes[1].id", &json!("s_2")), ("scenes[2].id", &json!("s_2_2"))]
    );

    let repaired = outcome.script.expect("patched script");
    assert!(validator.validate(&repaired, &model).valid);
}

#[test]
fn it_should_keep_id_errors_it_cannot_fix() {
    let model = cube();
    // Mistyped endpoints keep the second line unparsed, so its id is never rewritten.
    let script = script_with(json!([
        { "do": "drawLine", "id": "l", "from": "A", "to": "B" },
        { "do": "drawLine", "id": "l", "from": 1, "to": "B" }
    ]));
    let report = Validator::default().validate(&script, &model);
    assert!(report.has_error(ErrorKind::DuplicateId));

    let outcome = AutoRepairer::new().repair(&script, &report.errors, &model);
    assert!(!outcome.fixed);
    assert!(outcome.fixes.is_empty());
    assert_eq!(outcome.remaining_errors, report.errors);
}
