//! Validation diagnostics: path-annotated values, never errors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Blocking problems found by the validator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingReference,
    InvalidFoldId,
    InvalidRange,
    InvalidPhi,
    MissingId,
    DuplicateId,
    InvalidPreset,
    UnknownAction,
    InvalidCamera,
}

impl ErrorKind {
    /// Kinds the [`AutoRepairer`](crate::AutoRepairer) knows how to fix.
    pub fn is_repairable(self) -> bool {
        matches!(
            self,
            ErrorKind::MissingId | ErrorKind::DuplicateId | ErrorKind::InvalidPhi | ErrorKind::InvalidPreset
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MissingReference => "missing_reference",
            ErrorKind::InvalidFoldId => "invalid_fold_id",
            ErrorKind::InvalidRange => "invalid_range",
            ErrorKind::InvalidPhi => "invalid_phi",
            ErrorKind::MissingId => "missing_id",
            ErrorKind::DuplicateId => "duplicate_id",
            ErrorKind::InvalidPreset => "invalid_preset",
            ErrorKind::UnknownAction => "unknown_action",
            ErrorKind::InvalidCamera => "invalid_camera",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    PhiEdgeValue,
    LongScene,
    MissingNarration,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    /// Location in the script, e.g. `scenes[1].actions[0].id`.
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(kind: ErrorKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.kind.as_str(), self.path, self.message)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(kind: WarningKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn from_parts(errors: Vec<ValidationError>, warnings: Vec<ValidationWarning>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    pub fn has_error(&self, kind: ErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }

    pub fn has_warning(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }

    pub fn error_at(&self, path: &str) -> Option<&ValidationError> {
        self.errors.iter().find(|e| e.path == path)
    }
}
