pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Transform is not invertible (determinant {determinant})")]
    SingularTransform { determinant: f64 },

    #[error("Malformed path data: {message}")]
    MalformedPath { message: String },

    #[error("Cannot re-solve elliptical arc: {reason}")]
    DegenerateEllipseSolve { reason: &'static str },

    #[error("Invalid transform list: {message}")]
    InvalidTransformList { message: String },
}

pub(crate) fn malformed_path(message: impl Into<String>) -> Error {
    Error::MalformedPath {
        message: message.into(),
    }
}

pub(crate) fn invalid_transform(message: impl Into<String>) -> Error {
    Error::InvalidTransformList {
        message: message.into(),
    }
}
