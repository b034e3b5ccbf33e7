use thiserror::Error;

/// Failures of a single scan run.
///
/// Every variant halts the pipeline at the stage where it happened and maps
/// to exactly one user-facing message (see [`ScanError::user_message`]).
/// The `Display` text carries the technical detail for logs.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScanError {
    #[error("Invalid file type '{media_type}': must be an image")]
    InvalidFileType { media_type: String },

    #[error("Image conversion failed: {0}")]
    ConversionFailed(String),

    #[error("Unsupported image format '{media_type}'")]
    UnsupportedFormat { media_type: String },

    #[error("File too large: {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge { size: usize, limit: usize },

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Analysis incomplete: {0}")]
    AnalysisIncomplete(String),

    #[error("Save failed: {0}")]
    SaveFailed(String),

    #[error("A scan is already in progress ({stage})")]
    SessionBusy { stage: String },

    #[error("Scan cancelled")]
    Cancelled,
}

impl ScanError {
    /// The message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ScanError::InvalidFileType { .. } => "Please select a valid image file.".to_string(),
            ScanError::ConversionFailed(_) => {
                "Failed to process the image. Please try a different file or convert it to JPG/PNG first."
                    .to_string()
            }
            ScanError::UnsupportedFormat { .. } => {
                "Please upload a JPG, JPEG, or PNG image only.".to_string()
            }
            ScanError::FileTooLarge { .. } => {
                "File too large - please use an image under 10MB".to_string()
            }
            ScanError::UploadFailed(_) => {
                "Failed to upload your image. Please check your internet connection and try again."
                    .to_string()
            }
            ScanError::AnalysisIncomplete(_) => {
                "The AI could not properly analyze this image. Please try a clearer photo of the plant."
                    .to_string()
            }
            ScanError::SaveFailed(_) => {
                "Could not save the plant to your garden. Please try again.".to_string()
            }
            ScanError::SessionBusy { .. } => {
                "Please wait for the current scan to finish.".to_string()
            }
            ScanError::Cancelled => "The scan was cancelled.".to_string(),
        }
    }

    /// Whether the user can recover by acting again (reselecting, retrying).
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ScanError::SessionBusy { .. })
    }
}

impl From<ScanError> for String {
    fn from(err: ScanError) -> Self {
        err.user_message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_too_large_display_carries_sizes() {
        let err = ScanError::FileTooLarge {
            size: 12 * 1024 * 1024,
            limit: 10 * 1024 * 1024,
        };
        let text = err.to_string();
        assert!(text.contains("12582912"));
        assert!(text.contains("10485760"));
        assert!(err.user_message().contains("under 10MB"));
    }

    #[test]
    fn test_into_string_uses_user_message() {
        let msg: String = ScanError::UploadFailed("connection reset".to_string()).into();
        assert!(msg.contains("internet connection"));
        assert!(!msg.contains("connection reset"));
    }

    #[test]
    fn test_save_failed_is_recoverable() {
        assert!(ScanError::SaveFailed("db locked".to_string()).is_recoverable());
        assert!(!ScanError::SessionBusy {
            stage: "Uploading".to_string()
        }
        .is_recoverable());
    }
}
