//! Error types for the preview service, style documents, image export and
//! application startup.

/// Errors talking to the geometry service.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ServiceError {
    /// A request field was missing or not a finite number.
    #[error("parameter '{0}' is not a valid number")]
    MalformedParameter(String),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The service did not answer before the request deadline.
    #[error("service did not respond in time: {0}")]
    Timeout(String),

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout(err.to_string())
        } else if err.is_decode() {
            ServiceError::Decode(err.to_string())
        } else {
            ServiceError::Transport(err.to_string())
        }
    }
}

/// Errors loading a style document.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StyleError {
    /// The document is not valid JSON.
    #[error("failed to parse style document: {0}")]
    Parse(String),

    /// The document is valid JSON but not an object.
    #[error("style document must be a JSON object")]
    NotAnObject,

    /// A recognized key held a value of the wrong type.
    #[error("invalid value for style field '{field}': {reason}")]
    Field {
        /// camelCase key
        field: String,
        /// What was wrong with it
        reason: String,
    },
}

/// Errors rasterizing the preview.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExportError {
    /// The generated SVG was rejected by the parser.
    #[error("failed to parse SVG for PNG export: {0}")]
    Svg(String),

    /// A pixmap of the requested size could not be allocated.
    #[error("failed to create pixmap {width}x{height}")]
    Pixmap {
        /// Requested width in pixels
        width: u32,
        /// Requested height in pixels
        height: u32,
    },

    /// PNG encoding failed.
    #[error("failed to encode PNG: {0}")]
    Encode(String),

    /// There is no geometry to export yet.
    #[error("no preview to export")]
    NothingToExport,
}

/// Errors that abort application startup.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The async runtime could not be created.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),

    /// The window or graphics context could not be created.
    #[error("failed to start user interface: {0}")]
    Ui(#[from] eframe::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ServiceError::Status {
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(err.to_string(), "service returned 500: boom");
        assert_eq!(
            ServiceError::MalformedParameter("rows".into()).to_string(),
            "parameter 'rows' is not a valid number"
        );
        assert_eq!(
            ExportError::Pixmap { width: 0, height: 3 }.to_string(),
            "failed to create pixmap 0x3"
        );
    }
}
