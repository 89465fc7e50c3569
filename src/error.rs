use crate::synthesizer::SynthesisError;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    /// Settings violate an invariant; raised when settings are built or loaded
    InvalidConfig(String),
    UnknownFormat(String),
    /// An example payload could not be synthesized for one endpoint
    Synthesis {
        handler: String,
        action: String,
        source: SynthesisError,
    },
    SerializationError(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::UnknownFormat(name) => {
                write!(f, "Invalid format: '{}' (expected json, markdown or html)", name)
            }
            Error::Synthesis {
                handler,
                action,
                source,
            } => write!(
                f,
                "Cannot build example for {}::{}: {}",
                handler, action, source
            ),
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            Error::Synthesis { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON: {}", err))
    }
}

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Error::SerializationError(format!("formatting: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::InvalidConfig(format!("settings file: {}", err))
    }
}
