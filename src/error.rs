use std::fmt;

use thiserror::Error;

/// One rejected request field, addressed by its JSON path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub(crate) fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid request JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation failed ({} field error(s))", .0.len())]
    Validation(Vec<FieldError>),

    #[error("photo is larger than 5MB")]
    PhotoTooLarge,

    #[error("photo could not be decoded: {0}")]
    Image(String),

    #[error("font error: {0}")]
    Font(String),
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}
