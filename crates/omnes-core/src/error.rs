use thiserror::Error;

/// Top-level error type for the Omnes assistant.
///
/// The relay and widget crates define their own error types and convert into
/// `OmnesError` where a failure has to cross a crate boundary (for example
/// when the binary starts the relay server).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OmnesError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Relay error: {0}")]
    Relay(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Widget error: {0}")]
    Widget(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for OmnesError {
    fn from(err: toml::de::Error) -> Self {
        OmnesError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for OmnesError {
    fn from(err: toml::ser::Error) -> Self {
        OmnesError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for OmnesError {
    fn from(err: serde_json::Error) -> Self {
        OmnesError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Omnes operations.
pub type Result<T> = std::result::Result<T, OmnesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OmnesError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");

        let err = OmnesError::Relay("bind failed".to_string());
        assert_eq!(err.to_string(), "Relay error: bind failed");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: OmnesError = io_err.into();
        assert!(matches!(err, OmnesError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("not = [valid").unwrap_err();
        let err: OmnesError = toml_err.into();
        assert!(matches!(err, OmnesError::Config(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: OmnesError = json_err.into();
        assert!(matches!(err, OmnesError::Serialization(_)));
    }
}
