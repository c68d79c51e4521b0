use thiserror::Error;

/// Structured error types for the lunar segmentation service.
///
/// Each variant captures context specific to its error domain (validation,
/// decoding, image processing, model operations). The wire format collapses
/// all of them into `500` + `{"error": <message>}`, so the enum exists mainly
/// to keep user-correctable failures (`Validation`, `Decode`) distinguishable
/// from systemic ones (`Model`) in logs.
#[derive(Error, Debug)]
pub enum LunarSegError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// User-correctable input rejection. The message is surfaced verbatim and
    /// must carry the offending dimensions or channel count.
    #[error("{reason}")]
    Validation { reason: String },

    /// The uploaded bytes are not a decodable image. Surfaced generically.
    #[error("failed to decode uploaded bytes as an image")]
    Decode {
        #[source]
        source: image::ImageError,
    },

    #[error("Image processing error: {operation} failed")]
    ImageProcessing {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Model error: {operation} failed")]
    Model {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

pub type Result<T> = std::result::Result<T, LunarSegError>;

/// Convert anyhow errors to configuration errors.
///
/// Startup preconditions are checked with anyhow at the binary boundary;
/// anything crossing into the library converts here.
impl From<anyhow::Error> for LunarSegError {
    fn from(err: anyhow::Error) -> Self {
        LunarSegError::Configuration {
            message: err.to_string(),
        }
    }
}

/// Convert image crate errors to decode errors.
///
/// Decoding uploaded bytes is where the image crate fails on user input;
/// encoding to an in-memory PNG wraps its error with an explicit operation
/// instead of using this conversion.
impl From<image::ImageError> for LunarSegError {
    fn from(err: image::ImageError) -> Self {
        Self::Decode { source: err }
    }
}

/// Convert ONNX Runtime errors to model errors.
impl From<ort::Error> for LunarSegError {
    fn from(err: ort::Error) -> Self {
        Self::Model {
            operation: "ort operation".to_string(),
            source: Box::new(err),
        }
    }
}

/// Convert ndarray shape errors to model errors.
///
/// Shape errors occur during tensor operations which are part of model
/// inference, so they're categorized as model errors rather than a separate
/// tensor error type.
impl From<ndarray::ShapeError> for LunarSegError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::Model {
            operation: "tensor shape conversion".to_string(),
            source: Box::new(err),
        }
    }
}
