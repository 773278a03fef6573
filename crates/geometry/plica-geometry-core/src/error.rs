//! Contract violations raised by the evaluator.

/// Errors raised when an id or definition cannot be evaluated. These indicate a
/// model or script that bypassed validation; they are not recoverable diagnostics.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum GeometryError {
    #[error("unknown vertex: {id}")]
    UnknownVertex { id: String },

    #[error("unknown point: {id}")]
    UnknownPoint { id: String },

    #[error("unknown measurement: {id}")]
    UnknownMeasurement { id: String },

    #[error("no value for parameter: {id}")]
    UnknownParameter { id: String },

    #[error("malformed definition '{id}': {reason}")]
    MalformedDefinition { id: String, reason: String },

    #[error("unsupported solid type: {kind}")]
    UnsupportedSolidType { kind: String },

    #[error("cyclic point definition: {}", chain.join(" -> "))]
    CyclicDefinition { chain: Vec<String> },
}

impl GeometryError {
    pub(crate) fn malformed(id: &str, reason: impl Into<String>) -> Self {
        Self::MalformedDefinition {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}
