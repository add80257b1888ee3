use thiserror::Error;

/// Main error type for the meter bridge
#[derive(Error, Debug)]
pub enum MeterError {
    #[error("Connection error: {0}")]
    Connection(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Timed out")]
    Timeout,

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Publish error: {0}")]
    Publish(String),
}

impl MeterError {
    /// Whether this error comes from the byte stream itself
    ///
    /// Transport failures are fatal to the running process; everything else is
    /// raised by configuration or by the output side.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Decode(_))
    }
}

/// Result type alias for meter bridge operations
pub type MeterResult<T> = Result<T, MeterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts_to_connection() {
        let err: MeterError =
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone").into();
        assert!(matches!(err, MeterError::Connection(_)));
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "Connection error: gone");
    }

    #[test]
    fn test_publish_error_is_not_transport() {
        assert!(!MeterError::Publish("broker".to_string()).is_transport());
        assert!(!MeterError::Config("parity".to_string()).is_transport());
        assert!(!MeterError::Timeout.is_transport());
    }
}
