use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpellError {
    #[error("spell is missing its slug")]
    MissingSlug,
    #[error("spell '{slug}' is missing its name")]
    MissingName { slug: String },
    #[error("spell '{slug}' has level {level}, expected 0 to 9")]
    LevelOutOfRange { slug: String, level: u8 },
    #[error("spell '{slug}' lists no classes")]
    NoClasses { slug: String },
}

/// A payload that does not map onto a request or reply envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("unknown option code {0}")]
    UnknownOption(u8),
    #[error("{request} request requires field '{field}'")]
    MissingField {
        request: &'static str,
        field: &'static str,
    },
    #[error("sort request names no sort key")]
    MissingSortKey,
    #[error("expected an {expected}-byte integer reply, got {actual} bytes")]
    ScalarWidth { expected: usize, actual: usize },
    #[error("payload is not valid JSON: {0}")]
    Json(String),
    #[error("request failed validation: {0}")]
    Invalid(#[from] ValidationError),
}

impl From<serde_json::Error> for ProtocolError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: u32,
        max: u32,
        value: u32,
    },
    #[error("unknown dice operator '{0}', expected + or -")]
    UnknownOperator(String),
}
