use thiserror::Error;

/// Failures reported by (or while talking to) the vision service.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("resource already exists: {0}")]
    AlreadyExists(String),
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("image rejected: {0}")]
    InvalidImage(String),
    #[error("request rejected ({kind}): {message}")]
    Rejected { kind: String, message: String },
    #[error("vision service unreachable: {0}")]
    Transport(String),
    #[error("unexpected vision service response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Maps an error-type name from a service error body onto a variant.
    pub fn from_kind(kind: &str, message: String) -> Self {
        let short = kind.rsplit('#').next().unwrap_or(kind);
        match short {
            "ResourceAlreadyExistsException" => ServiceError::AlreadyExists(message),
            "ResourceNotFoundException" => ServiceError::NotFound(message),
            "InvalidParameterException" | "InvalidImageFormatException"
            | "ImageTooLargeException" => ServiceError::InvalidImage(message),
            _ => ServiceError::Rejected {
                kind: short.to_string(),
                message,
            },
        }
    }
}
