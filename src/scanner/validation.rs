//! Parse-and-validate for the analysis service's JSON.
//!
//! Mandatory fields: `common_name`, `species_name`, `health_status`.
//! Missing any of them makes the response unusable.
//!
//! Defaultable fields: `health_analysis.issues`, recommendations and
//! `care_tips`. When these are absent (or empty) they are filled with fixed
//! placeholder content and the field name is recorded in
//! `AnalysisResult::repaired_fields`.

use serde_json::Value;
use tracing::{debug, warn};

use super::types::{AnalysisResult, HealthAnalysis, HealthIssue, HealthStatus};
use crate::error::ScanError;

pub const DEFAULT_ISSUE: &str = "Analysis completed";
pub const DEFAULT_ISSUE_DESCRIPTION: &str = "Basic analysis performed successfully";
pub const DEFAULT_ISSUE_CONFIDENCE: f32 = 0.8;
pub const DEFAULT_RECOMMENDATION: &str = "Continue regular plant care";
pub const DEFAULT_CARE_TIP: &str = "Provide adequate light and water for this plant species";

/// Validate a raw analysis response and build the presented result.
///
/// `image_url` is the uploaded photo and always overrides anything the
/// model echoed back.
pub fn parse_analysis_response(raw: &Value, image_url: &str) -> Result<AnalysisResult, ScanError> {
    let decoded;
    let json = match raw {
        // Some backends hand back the model output as a JSON string
        Value::String(text) => {
            decoded = parse_response_text(text).map_err(ScanError::AnalysisIncomplete)?;
            &decoded
        }
        other => other,
    };

    if !json.is_object() {
        return Err(ScanError::AnalysisIncomplete(format!(
            "Expected a JSON object, got {}",
            json_kind(json)
        )));
    }

    let common_name = non_blank_str(&json["common_name"]);
    let species_name = non_blank_str(&json["species_name"]);
    let status_label = non_blank_str(&json["health_status"]);

    let mut missing = Vec::new();
    if common_name.is_none() {
        missing.push("common_name");
    }
    if species_name.is_none() {
        missing.push("species_name");
    }
    if status_label.is_none() {
        missing.push("health_status");
    }
    if !missing.is_empty() {
        let msg = format!("Missing required field(s): {}", missing.join(", "));
        warn!("{}", msg);
        return Err(ScanError::AnalysisIncomplete(msg));
    }

    let status_label = status_label.unwrap_or_default();
    let health_status = HealthStatus::parse(&status_label).ok_or_else(|| {
        let msg = format!("Unrecognized health_status '{}'", status_label);
        warn!("{}", msg);
        ScanError::AnalysisIncomplete(msg)
    })?;

    let mut repaired_fields = Vec::new();

    let mut issues = parse_issues(&json["health_analysis"]["issues"]);
    if issues.is_empty() {
        repaired_fields.push("health_analysis.issues".to_string());
        issues.push(HealthIssue {
            issue: DEFAULT_ISSUE.to_string(),
            description: DEFAULT_ISSUE_DESCRIPTION.to_string(),
            confidence: DEFAULT_ISSUE_CONFIDENCE,
        });
    }

    // Models sometimes put recommendations at the top level
    let mut recommendations = string_list(&json["health_analysis"]["recommendations"]);
    if recommendations.is_empty() {
        recommendations = string_list(&json["recommendations"]);
    }
    if recommendations.is_empty() {
        repaired_fields.push("health_analysis.recommendations".to_string());
        recommendations.push(DEFAULT_RECOMMENDATION.to_string());
    }

    let mut care_tips = string_list(&json["care_tips"]);
    if care_tips.is_empty() {
        repaired_fields.push("care_tips".to_string());
        care_tips.push(DEFAULT_CARE_TIP.to_string());
    }

    if !repaired_fields.is_empty() {
        debug!("Repaired analysis fields with defaults: {:?}", repaired_fields);
    }

    Ok(AnalysisResult {
        common_name: common_name.unwrap_or_default(),
        species_name: species_name.unwrap_or_default(),
        description: json["description"]
            .as_str()
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
        health_status,
        health_analysis: HealthAnalysis {
            issues,
            recommendations,
        },
        care_tips,
        image_url: image_url.to_string(),
        repaired_fields,
    })
}

/// Parse model output text as JSON, tolerating markdown code fences.
pub fn parse_response_text(text: &str) -> Result<Value, String> {
    let cleaned = strip_markdown_json(text);
    serde_json::from_str(&cleaned).map_err(|e| {
        let truncated = if cleaned.len() > 500 {
            let mut end = 500;
            while !cleaned.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &cleaned[..end])
        } else {
            cleaned.clone()
        };
        format!(
            "Failed to parse analysis response as JSON: {}. Raw response (first 500 chars): {}",
            e, truncated
        )
    })
}

/// Strip markdown code fences from model output if present.
pub fn strip_markdown_json(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        // Remove opening fence (with optional language tag)
        let after_open = match trimmed.find('\n') {
            Some(pos) => &trimmed[pos + 1..],
            None => trimmed.trim_start_matches('`'),
        };
        let cleaned = after_open.trim_end();
        cleaned
            .strip_suffix("```")
            .unwrap_or(cleaned)
            .trim()
            .to_string()
    } else {
        trimmed.to_string()
    }
}

fn parse_issues(value: &Value) -> Vec<HealthIssue> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let issue = non_blank_str(&item["issue"])?;
            Some(HealthIssue {
                issue,
                description: item["description"]
                    .as_str()
                    .map(|s| s.trim().to_string())
                    .unwrap_or_default(),
                confidence: item["confidence"]
                    .as_f64()
                    .map(|c| c.clamp(0.0, 1.0) as f32)
                    .unwrap_or(0.0),
            })
        })
        .collect()
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(non_blank_str).collect())
        .unwrap_or_default()
}

fn non_blank_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const URL: &str = "https://files.example/uploads/fern.jpg";

    fn complete_response() -> Value {
        json!({
            "common_name": "Boston Fern",
            "species_name": "Nephrolepis exaltata",
            "description": "A lush, arching fern.",
            "health_status": "Needs Attention",
            "health_analysis": {
                "issues": [
                    {"issue": "Brown fronds", "description": "Low humidity", "confidence": 0.72}
                ],
                "recommendations": ["Mist daily", "Move away from heaters"]
            },
            "care_tips": ["Keep soil moist", "Indirect light"]
        })
    }

    #[test]
    fn test_complete_response_presented_unmodified() {
        let result = parse_analysis_response(&complete_response(), URL).unwrap();
        assert_eq!(result.common_name, "Boston Fern");
        assert_eq!(result.species_name, "Nephrolepis exaltata");
        assert_eq!(result.health_status, HealthStatus::NeedsAttention);
        assert_eq!(result.health_analysis.issues.len(), 1);
        assert_eq!(result.health_analysis.issues[0].confidence, 0.72);
        assert_eq!(result.health_analysis.recommendations.len(), 2);
        assert_eq!(result.care_tips, vec!["Keep soil moist", "Indirect light"]);
        assert_eq!(result.image_url, URL);
        assert!(!result.was_repaired());
    }

    #[test]
    fn test_missing_care_tips_gets_single_default() {
        let mut response = complete_response();
        response.as_object_mut().unwrap().remove("care_tips");

        let result = parse_analysis_response(&response, URL).unwrap();
        assert_eq!(result.care_tips, vec![DEFAULT_CARE_TIP.to_string()]);
        assert_eq!(result.repaired_fields, vec!["care_tips".to_string()]);
    }

    #[test]
    fn test_missing_health_analysis_gets_defaults() {
        let response = json!({
            "common_name": "Aloe",
            "species_name": "Aloe vera",
            "health_status": "Healthy"
        });

        let result = parse_analysis_response(&response, URL).unwrap();
        assert_eq!(result.health_analysis.issues.len(), 1);
        assert_eq!(result.health_analysis.issues[0].issue, DEFAULT_ISSUE);
        assert_eq!(result.health_analysis.issues[0].confidence, DEFAULT_ISSUE_CONFIDENCE);
        assert_eq!(
            result.health_analysis.recommendations,
            vec![DEFAULT_RECOMMENDATION.to_string()]
        );
        assert_eq!(result.care_tips.len(), 1);
        assert_eq!(result.description, "");
        assert_eq!(result.repaired_fields.len(), 3);
    }

    #[test]
    fn test_top_level_recommendations_are_used() {
        let response = json!({
            "common_name": "Aloe",
            "species_name": "Aloe vera",
            "health_status": "Healthy",
            "recommendations": ["Water sparingly"]
        });

        let result = parse_analysis_response(&response, URL).unwrap();
        assert_eq!(result.health_analysis.recommendations, vec!["Water sparingly"]);
        assert!(!result
            .repaired_fields
            .contains(&"health_analysis.recommendations".to_string()));
    }

    #[test]
    fn test_missing_common_name_is_incomplete() {
        let mut response = complete_response();
        response.as_object_mut().unwrap().remove("common_name");

        let err = parse_analysis_response(&response, URL).unwrap_err();
        match err {
            ScanError::AnalysisIncomplete(msg) => assert!(msg.contains("common_name")),
            other => panic!("expected AnalysisIncomplete, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_species_name_is_incomplete() {
        let mut response = complete_response();
        response["species_name"] = json!("   ");
        let err = parse_analysis_response(&response, URL).unwrap_err();
        assert!(matches!(err, ScanError::AnalysisIncomplete(_)));
    }

    #[test]
    fn test_unknown_health_status_is_incomplete() {
        let mut response = complete_response();
        response["health_status"] = json!("Thriving");
        let err = parse_analysis_response(&response, URL).unwrap_err();
        match err {
            ScanError::AnalysisIncomplete(msg) => assert!(msg.contains("Thriving")),
            other => panic!("expected AnalysisIncomplete, got {:?}", other),
        }
    }

    #[test]
    fn test_non_object_is_incomplete() {
        let err = parse_analysis_response(&json!([1, 2, 3]), URL).unwrap_err();
        match err {
            ScanError::AnalysisIncomplete(msg) => assert!(msg.contains("an array")),
            other => panic!("expected AnalysisIncomplete, got {:?}", other),
        }
    }

    #[test]
    fn test_string_response_with_fences_is_decoded() {
        let text = format!("```json\n{}\n```", complete_response());
        let result = parse_analysis_response(&Value::String(text), URL).unwrap();
        assert_eq!(result.common_name, "Boston Fern");
    }

    #[test]
    fn test_garbage_string_is_incomplete() {
        let err = parse_analysis_response(&json!("I think it is a fern"), URL).unwrap_err();
        match err {
            ScanError::AnalysisIncomplete(msg) => assert!(msg.contains("Failed to parse")),
            other => panic!("expected AnalysisIncomplete, got {:?}", other),
        }
    }

    #[test]
    fn test_model_image_url_is_overridden() {
        let mut response = complete_response();
        response["image_url"] = json!("https://hallucinated.example/x.png");
        let result = parse_analysis_response(&response, URL).unwrap();
        assert_eq!(result.image_url, URL);
    }

    #[test]
    fn test_issue_confidence_is_clamped_and_invalid_items_skipped() {
        let mut response = complete_response();
        response["health_analysis"]["issues"] = json!([
            {"issue": "Root rot", "description": "Overwatering", "confidence": 1.7},
            {"description": "no issue name"},
            "not an object",
            {"issue": "Aphids", "confidence": -0.2}
        ]);

        let result = parse_analysis_response(&response, URL).unwrap();
        let issues = &result.health_analysis.issues;
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].confidence, 1.0);
        assert_eq!(issues[1].issue, "Aphids");
        assert_eq!(issues[1].confidence, 0.0);
        assert_eq!(issues[1].description, "");
    }

    #[test]
    fn test_strip_markdown_json() {
        assert_eq!(strip_markdown_json("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_markdown_json("```\n{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_markdown_json("  {\"a\":1}  "), "{\"a\":1}");
    }
}
