use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptionError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Video encoder not available: {0}")]
    EncoderUnavailable(String),

    #[error("Video encoder exited with {status}: {stderr}")]
    EncodeFailed { status: String, stderr: String },

    #[error("Video encoder timed out after {0} seconds")]
    EncodeTimedOut(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Render capacity exhausted: {0} jobs already running")]
    Busy(usize),
}

impl CaptionError {
    /// Stable category name, suitable for choosing user-facing guidance.
    pub fn kind(&self) -> &'static str {
        match self {
            CaptionError::Validation(_) => "invalid_request",
            CaptionError::Format(_) => "format",
            CaptionError::EncoderUnavailable(_) => "encoder_unavailable",
            CaptionError::EncodeFailed { .. } => "encode_failed",
            CaptionError::EncodeTimedOut(_) => "encode_timeout",
            CaptionError::Io(_) => "io",
            CaptionError::Json(_) => "invalid_request",
            CaptionError::Config(_) => "config",
            CaptionError::Busy(_) => "busy",
        }
    }
}

pub type Result<T> = std::result::Result<T, CaptionError>;
