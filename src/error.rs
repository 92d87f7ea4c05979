use thiserror::Error;

/// Errors raised while building or displaying gauges.
#[derive(Error, Debug)]
pub enum GaugeError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Font could not be loaded: {0}")]
    Font(String),

    #[error("Window error: {0}")]
    Window(String),

    #[error("Unrecognized command: {0}")]
    Command(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<winit::error::EventLoopError> for GaugeError {
    fn from(err: winit::error::EventLoopError) -> Self {
        GaugeError::Window(err.to_string())
    }
}

impl From<winit::error::OsError> for GaugeError {
    fn from(err: winit::error::OsError) -> Self {
        GaugeError::Window(err.to_string())
    }
}

impl From<pixels::Error> for GaugeError {
    fn from(err: pixels::Error) -> Self {
        GaugeError::Window(err.to_string())
    }
}

/// Errors raised by the catalog stores and their collaborators.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog API request failed: {0}")]
    Api(String),

    #[error("No record with id {0}")]
    NotFound(String),

    #[error("Persistence failure: {0}")]
    Persistence(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = GaugeError::InvalidConfig("min must be below max".to_string());
        assert!(err.to_string().contains("min must be below max"));

        let err = CatalogError::NotFound("m-7".to_string());
        assert_eq!(err.to_string(), "No record with id m-7");
    }
}
