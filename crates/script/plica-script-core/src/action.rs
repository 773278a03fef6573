//! The closed action vocabulary of a scene script.
//!
//! On the wire an action is a JSON object discriminated by its `do` field. Parsing
//! never fails: anything that does not fit one of the known shapes becomes
//! [`Action::Unrecognized`], keeping the raw object so the validator can report it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Nominal durations (seconds) used when an action does not supply its own.
pub mod durations {
    pub const SHOW: f64 = 0.5;
    pub const FADE: f64 = 0.8;
    pub const HIGHLIGHT: f64 = 1.0;
    pub const PULSE: f64 = 1.5;
    pub const DRAW_LINE: f64 = 1.0;
    pub const SHOW_PATH: f64 = 0.8;
    pub const SHOW_PLANE: f64 = 1.0;
    pub const SHOW_TETRAHEDRON: f64 = 1.0;
    pub const ANIMATE_POINT: f64 = 3.0;
    pub const FOLD: f64 = 2.0;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Show,
    Hide,
    FadeIn,
    FadeOut,
    Highlight,
    Pulse,
    DrawLine,
    ShowPath,
    ShowPlane,
    ShowTetrahedron,
    AnimatePoint,
    Fold,
    Together,
    Wait,
}

impl ActionKind {
    pub const ALL: [ActionKind; 14] = [
        ActionKind::Show,
        ActionKind::Hide,
        ActionKind::FadeIn,
        ActionKind::FadeOut,
        ActionKind::Highlight,
        ActionKind::Pulse,
        ActionKind::DrawLine,
        ActionKind::ShowPath,
        ActionKind::ShowPlane,
        ActionKind::ShowTetrahedron,
        ActionKind::AnimatePoint,
        ActionKind::Fold,
        ActionKind::Together,
        ActionKind::Wait,
    ];

    /// The `do` discriminator.
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Show => "show",
            ActionKind::Hide => "hide",
            ActionKind::FadeIn => "fadeIn",
            ActionKind::FadeOut => "fadeOut",
            ActionKind::Highlight => "highlight",
            ActionKind::Pulse => "pulse",
            ActionKind::DrawLine => "drawLine",
            ActionKind::ShowPath => "showPath",
            ActionKind::ShowPlane => "showPlane",
            ActionKind::ShowTetrahedron => "showTetrahedron",
            ActionKind::AnimatePoint => "animatePoint",
            ActionKind::Fold => "fold",
            ActionKind::Together => "together",
            ActionKind::Wait => "wait",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }

    /// Kinds that act on a single existing target.
    pub fn is_targeted(self) -> bool {
        matches!(
            self,
            ActionKind::Show
                | ActionKind::Hide
                | ActionKind::FadeIn
                | ActionKind::FadeOut
                | ActionKind::Highlight
                | ActionKind::Pulse
        )
    }

    /// Kinds that register a new element and therefore need an id.
    pub fn is_creation(self) -> bool {
        matches!(
            self,
            ActionKind::DrawLine
                | ActionKind::ShowPath
                | ActionKind::ShowPlane
                | ActionKind::ShowTetrahedron
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetAction {
    pub target: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FadeAction {
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HighlightAction {
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PulseAction {
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub times: Option<f64>,
}

impl PulseAction {
    /// Largest cycle count a pulse is compiled with.
    pub const MAX_REPETITIONS: u32 = 100;

    /// Number of on/off cycles: `times` floored, clamped to `1..=MAX_REPETITIONS`.
    pub fn repetitions(&self) -> u32 {
        self.times
            .filter(|t| t.is_finite())
            .map(|t| t.floor().clamp(1.0, f64::from(Self::MAX_REPETITIONS)) as u32)
            .unwrap_or(1)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Dashed,
    #[default]
    #[serde(other)]
    Solid,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrawLineAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<LineStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShowPathAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShowPlaneAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub points: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShowTetrahedronAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub vertices: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimatePointAction {
    pub target: String,
    pub from: f64,
    pub to: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoldAction {
    pub fold_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl FoldAction {
    pub fn start_angle(&self) -> f64 {
        self.from_angle.unwrap_or(0.0)
    }

    pub fn end_angle(&self) -> f64 {
        self.to_angle.unwrap_or(180.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TogetherAction {
    pub actions: Vec<Action>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WaitAction {
    #[serde(default)]
    pub duration: f64,
}

/// Why an action could not be parsed into a known variant.
#[derive(Clone, Debug, PartialEq)]
pub enum RawIssue {
    /// `do` is absent or not a string (or the action is not an object).
    MissingKind,
    UnknownKind(String),
    /// Known `do`, but the remaining fields do not fit that kind.
    Malformed { kind: ActionKind, detail: String },
}

/// An action kept verbatim because it did not parse.
#[derive(Clone, Debug, PartialEq)]
pub struct RawAction {
    pub raw: Value,
    pub issue: RawIssue,
}

impl RawAction {
    /// A string field of the raw object, if present.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.raw.get(key).and_then(Value::as_str)
    }

    pub fn malformed_kind(&self) -> Option<ActionKind> {
        match &self.issue {
            RawIssue::Malformed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Show(TargetAction),
    Hide(TargetAction),
    FadeIn(FadeAction),
    FadeOut(FadeAction),
    Highlight(HighlightAction),
    Pulse(PulseAction),
    DrawLine(DrawLineAction),
    ShowPath(ShowPathAction),
    ShowPlane(ShowPlaneAction),
    ShowTetrahedron(ShowTetrahedronAction),
    AnimatePoint(AnimatePointAction),
    Fold(FoldAction),
    Together(TogetherAction),
    Wait(WaitAction),
    Unrecognized(RawAction),
}

impl Action {
    /// Parse one wire action. Never fails; see [`RawIssue`].
    pub fn from_value(value: Value) -> Action {
        let name = value.get("do").and_then(Value::as_str).map(str::to_owned);
        let Some(name) = name else {
            return Action::Unrecognized(RawAction {
                raw: value,
                issue: RawIssue::MissingKind,
            });
        };
        let Some(kind) = ActionKind::parse(&name) else {
            return Action::Unrecognized(RawAction {
                raw: value,
                issue: RawIssue::UnknownKind(name),
            });
        };
        match ActionRepr::deserialize(&value) {
            Ok(repr) => repr.into(),
            Err(err) => Action::Unrecognized(RawAction {
                raw: value,
                issue: RawIssue::Malformed {
                    kind,
                    detail: err.to_string(),
                },
            }),
        }
    }

    /// `None` only for [`Action::Unrecognized`].
    pub fn kind(&self) -> Option<ActionKind> {
        Some(match self {
            Action::Show(_) => ActionKind::Show,
            Action::Hide(_) => ActionKind::Hide,
            Action::FadeIn(_) => ActionKind::FadeIn,
            Action::FadeOut(_) => ActionKind::FadeOut,
            Action::Highlight(_) => ActionKind::Highlight,
            Action::Pulse(_) => ActionKind::Pulse,
            Action::DrawLine(_) => ActionKind::DrawLine,
            Action::ShowPath(_) => ActionKind::ShowPath,
            Action::ShowPlane(_) => ActionKind::ShowPlane,
            Action::ShowTetrahedron(_) => ActionKind::ShowTetrahedron,
            Action::AnimatePoint(_) => ActionKind::AnimatePoint,
            Action::Fold(_) => ActionKind::Fold,
            Action::Together(_) => ActionKind::Together,
            Action::Wait(_) => ActionKind::Wait,
            Action::Unrecognized(_) => return None,
        })
    }

    /// Time the action occupies on the scene cursor. A `together` group lasts as
    /// long as its longest child.
    pub fn nominal_duration(&self) -> f64 {
        match self {
            Action::Show(_) | Action::Hide(_) => durations::SHOW,
            Action::FadeIn(a) | Action::FadeOut(a) => non_negative(a.duration, durations::FADE),
            Action::Highlight(_) => durations::HIGHLIGHT,
            Action::Pulse(_) => durations::PULSE,
            Action::DrawLine(_) => durations::DRAW_LINE,
            Action::ShowPath(_) => durations::SHOW_PATH,
            Action::ShowPlane(_) => durations::SHOW_PLANE,
            Action::ShowTetrahedron(_) => durations::SHOW_TETRAHEDRON,
            Action::AnimatePoint(a) => non_negative(a.duration, durations::ANIMATE_POINT),
            Action::Fold(a) => non_negative(a.duration, durations::FOLD),
            Action::Together(group) => group
                .actions
                .iter()
                .map(Action::nominal_duration)
                .fold(0.0, f64::max),
            Action::Wait(w) => w.duration.max(0.0),
            Action::Unrecognized(_) => 0.0,
        }
    }

    /// Id slot of a creation action.
    pub fn created_id(&self) -> Option<&Option<String>> {
        match self {
            Action::DrawLine(a) => Some(&a.id),
            Action::ShowPath(a) => Some(&a.id),
            Action::ShowPlane(a) => Some(&a.id),
            Action::ShowTetrahedron(a) => Some(&a.id),
            _ => None,
        }
    }

    pub fn created_id_mut(&mut self) -> Option<&mut Option<String>> {
        match self {
            Action::DrawLine(a) => Some(&mut a.id),
            Action::ShowPath(a) => Some(&mut a.id),
            Action::ShowPlane(a) => Some(&mut a.id),
            Action::ShowTetrahedron(a) => Some(&mut a.id),
            _ => None,
        }
    }

    /// Point ids a creation action is built from, in declaration order.
    pub fn anchor_points(&self) -> &[String] {
        match self {
            Action::ShowPlane(a) => &a.points,
            Action::ShowTetrahedron(a) => &a.vertices,
            _ => &[],
        }
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Action::from_value(value))
    }
}

impl Serialize for Action {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let tagged = match self {
            Action::Show(a) => ActionRef::Show(a),
            Action::Hide(a) => ActionRef::Hide(a),
            Action::FadeIn(a) => ActionRef::FadeIn(a),
            Action::FadeOut(a) => ActionRef::FadeOut(a),
            Action::Highlight(a) => ActionRef::Highlight(a),
            Action::Pulse(a) => ActionRef::Pulse(a),
            Action::DrawLine(a) => ActionRef::DrawLine(a),
            Action::ShowPath(a) => ActionRef::ShowPath(a),
            Action::ShowPlane(a) => ActionRef::ShowPlane(a),
            Action::ShowTetrahedron(a) => ActionRef::ShowTetrahedron(a),
            Action::AnimatePoint(a) => ActionRef::AnimatePoint(a),
            Action::Fold(a) => ActionRef::Fold(a),
            Action::Together(a) => ActionRef::Together(a),
            Action::Wait(a) => ActionRef::Wait(a),
            Action::Unrecognized(raw) => return raw.raw.serialize(serializer),
        };
        tagged.serialize(serializer)
    }
}

#[derive(Deserialize)]
#[serde(tag = "do", rename_all = "camelCase")]
enum ActionRepr {
    Show(TargetAction),
    Hide(TargetAction),
    FadeIn(FadeAction),
    FadeOut(FadeAction),
    Highlight(HighlightAction),
    Pulse(PulseAction),
    DrawLine(DrawLineAction),
    ShowPath(ShowPathAction),
    ShowPlane(ShowPlaneAction),
    ShowTetrahedron(ShowTetrahedronAction),
    AnimatePoint(AnimatePointAction),
    Fold(FoldAction),
    Together(TogetherAction),
    Wait(WaitAction),
}

impl From<ActionRepr> for Action {
    fn from(repr: ActionRepr) -> Self {
        match repr {
            ActionRepr::Show(a) => Action::Show(a),
            ActionRepr::Hide(a) => Action::Hide(a),
            ActionRepr::FadeIn(a) => Action::FadeIn(a),
            ActionRepr::FadeOut(a) => Action::FadeOut(a),
            ActionRepr::Highlight(a) => Action::Highlight(a),
            ActionRepr::Pulse(a) => Action::Pulse(a),
            ActionRepr::DrawLine(a) => Action::DrawLine(a),
            ActionRepr::ShowPath(a) => Action::ShowPath(a),
            ActionRepr::ShowPlane(a) => Action::ShowPlane(a),
            ActionRepr::ShowTetrahedron(a) => Action::ShowTetrahedron(a),
            ActionRepr::AnimatePoint(a) => Action::AnimatePoint(a),
            ActionRepr::Fold(a) => Action::Fold(a),
            ActionRepr::Together(a) => Action::Together(a),
            ActionRepr::Wait(a) => Action::Wait(a),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "do", rename_all = "camelCase")]
enum ActionRef<'a> {
    Show(&'a TargetAction),
    Hide(&'a TargetAction),
    FadeIn(&'a FadeAction),
    FadeOut(&'a FadeAction),
    Highlight(&'a HighlightAction),
    Pulse(&'a PulseAction),
    DrawLine(&'a DrawLineAction),
    ShowPath(&'a ShowPathAction),
    ShowPlane(&'a ShowPlaneAction),
    ShowTetrahedron(&'a ShowTetrahedronAction),
    AnimatePoint(&'a AnimatePointAction),
    Fold(&'a FoldAction),
    Together(&'a TogetherAction),
    Wait(&'a WaitAction),
}

/// Script-supplied duration, or `default` when absent. Negative values count as zero.
fn non_negative(duration: Option<f64>, default: f64) -> f64 {
    duration.unwrap_or(default).max(0.0)
}
