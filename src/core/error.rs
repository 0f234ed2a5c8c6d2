use thiserror::Error;

#[derive(Error, Debug)]
pub enum RtpError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Region '{0}' not found")]
    RegionNotFound(String),

    #[error("World '{0}' has no configuration")]
    WorldNotConfigured(String),

    #[error("Shape '{0}' is not registered")]
    ShapeNotFound(String),

    #[error("Economy error: {0}")]
    Economy(String),

    #[error("Placement error: {0}")]
    Placement(String),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("I/O error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, RtpError>;

impl<T> From<std::sync::PoisonError<T>> for RtpError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

impl From<std::io::Error> for RtpError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for RtpError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
