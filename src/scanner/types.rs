//! Type definitions for plant scanning.
//!
//! Covers the payload as it moves through the pipeline (selected file,
//! normalized image) and the structured result of the AI analysis.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

/// A file exactly as the user selected it.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub bytes: Vec<u8>,
    /// Declared media type, e.g. "image/webp"
    pub media_type: String,
    pub file_name: String,
}

impl ImageFile {
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
            file_name: file_name.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// An image whose encoding is one of the canonical upload formats.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedImage {
    pub bytes: Vec<u8>,
    /// Always "image/jpeg" or "image/png"
    pub media_type: String,
    pub file_name: String,
    /// True when the payload was re-encoded rather than passed through
    pub converted: bool,
}

impl NormalizedImage {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Inline `data:` URL for previewing the image before upload.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, STANDARD.encode(&self.bytes))
    }

    /// View this image as a selected file again (normalizing it is a no-op).
    pub fn as_image_file(&self) -> ImageFile {
        ImageFile::new(self.bytes.clone(), self.media_type.clone(), self.file_name.clone())
    }
}

/// Overall plant health as judged by the AI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    #[serde(rename = "Needs Attention")]
    NeedsAttention,
    Diseased,
}

impl HealthStatus {
    /// Parse the label the model returns. Tolerates case and separator drift
    /// ("needs_attention", "NEEDS ATTENTION").
    pub fn parse(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "healthy" => Some(HealthStatus::Healthy),
            "needsattention" => Some(HealthStatus::NeedsAttention),
            "diseased" => Some(HealthStatus::Diseased),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::NeedsAttention => "Needs Attention",
            HealthStatus::Diseased => "Diseased",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One diagnosed problem (or the "no issues" marker for healthy plants).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthIssue {
    pub issue: String,
    pub description: String,
    /// 0.0 - 1.0
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthAnalysis {
    pub issues: Vec<HealthIssue>,
    pub recommendations: Vec<String>,
}

/// Validated, possibly repaired analysis of one plant photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub common_name: String,
    pub species_name: String,
    pub description: String,
    pub health_status: HealthStatus,
    pub health_analysis: HealthAnalysis,
    pub care_tips: Vec<String>,
    /// URL of the uploaded photo
    pub image_url: String,
    /// Names of the secondary fields that were filled with defaults
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repaired_fields: Vec<String>,
}

impl AnalysisResult {
    pub fn was_repaired(&self) -> bool {
        !self.repaired_fields.is_empty()
    }
}

/// Everything sent to the analysis service for one run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest {
    pub file_url: String,
    pub prompt: String,
    pub response_schema: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serializes_with_space() {
        let json = serde_json::to_string(&HealthStatus::NeedsAttention).unwrap();
        assert_eq!(json, "\"Needs Attention\"");

        let parsed: HealthStatus = serde_json::from_str("\"Diseased\"").unwrap();
        assert_eq!(parsed, HealthStatus::Diseased);
    }

    #[test]
    fn test_health_status_parse_tolerates_drift() {
        assert_eq!(HealthStatus::parse("needs_attention"), Some(HealthStatus::NeedsAttention));
        assert_eq!(HealthStatus::parse(" HEALTHY "), Some(HealthStatus::Healthy));
        assert_eq!(HealthStatus::parse("Needs Attention"), Some(HealthStatus::NeedsAttention));
        assert_eq!(HealthStatus::parse("dying"), None);
        assert_eq!(HealthStatus::parse(""), None);
    }

    #[test]
    fn test_data_url_prefix() {
        let image = NormalizedImage {
            bytes: vec![0xFF, 0xD8, 0xFF],
            media_type: "image/jpeg".to_string(),
            file_name: "leaf.jpg".to_string(),
            converted: false,
        };
        assert_eq!(image.data_url(), "data:image/jpeg;base64,/9j/");
    }

    #[test]
    fn test_analysis_result_skips_empty_repaired_fields() {
        let result = AnalysisResult {
            common_name: "Snake Plant".to_string(),
            species_name: "Dracaena trifasciata".to_string(),
            description: String::new(),
            health_status: HealthStatus::Healthy,
            health_analysis: HealthAnalysis {
                issues: vec![],
                recommendations: vec![],
            },
            care_tips: vec![],
            image_url: "https://files.example/a.jpg".to_string(),
            repaired_fields: vec![],
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("repaired_fields"));
        assert!(json.contains("\"health_status\":\"Healthy\""));
        assert!(!result.was_repaired());
    }
}
