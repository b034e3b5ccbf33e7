//! Prompt text and response schema for plant analysis.

/// Instruction prompt sent with every uploaded plant photo.
pub const ANALYSIS_PROMPT: &str = r#"You are Green Guardian, an AI-powered botanist. Analyze the provided image of a plant.
1. **Identify the plant:** Determine its common name and scientific (species) name.
2. **Describe the plant:** Provide a brief, interesting one-paragraph description of the species.
3. **Assess its health:** Examine the leaves, stem, and soil for any signs of disease, pests, or nutrient deficiencies. Categorize the overall health as "Healthy", "Needs Attention", or "Diseased".
4. **Detail your findings:**
    * If there are issues, list them in the 'issues' array. For each issue, provide a 'description' and a 'confidence' score (0.0 to 1.0).
    * If the plant is healthy, state that in the 'issues' array, for example: [{"issue": "No issues detected", "description": "The plant appears to be in excellent condition.", "confidence": 0.99}].
5. **Provide recommendations:** Based on the health assessment, give a list of actionable 'recommendations' to help the user care for the plant. If healthy, provide general wellness tips.
6. **Offer general care tips:** Provide a list of general 'care_tips' for this specific plant species (e.g., sunlight, water, soil).
"#;

/// JSON schema the analysis response is expected to follow.
///
/// Mirrors the stored plant record. `image_url` is filled in locally from
/// the upload, so the model is not asked for it.
pub fn plant_analysis_json_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "common_name": {
                "type": "string",
                "description": "Common name of the plant"
            },
            "species_name": {
                "type": "string",
                "description": "Scientific (species) name"
            },
            "description": {
                "type": "string",
                "description": "One-paragraph description of the species"
            },
            "health_status": {
                "type": "string",
                "enum": ["Healthy", "Needs Attention", "Diseased"],
                "description": "Overall health assessment"
            },
            "health_analysis": {
                "type": "object",
                "properties": {
                    "issues": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "issue": { "type": "string" },
                                "description": { "type": "string" },
                                "confidence": {
                                    "type": "number",
                                    "minimum": 0,
                                    "maximum": 1
                                }
                            },
                            "required": ["issue", "description", "confidence"]
                        }
                    },
                    "recommendations": {
                        "type": "array",
                        "items": { "type": "string" }
                    }
                }
            },
            "care_tips": {
                "type": "array",
                "items": { "type": "string" }
            }
        },
        "required": ["common_name", "species_name", "health_status"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_requires_identification_fields() {
        let schema = plant_analysis_json_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(required, vec!["common_name", "species_name", "health_status"]);
    }

    #[test]
    fn test_schema_health_status_enum() {
        let schema = plant_analysis_json_schema();
        let values = schema["properties"]["health_status"]["enum"].as_array().unwrap();
        assert_eq!(values.len(), 3);
        assert!(values.contains(&serde_json::json!("Needs Attention")));
    }

    #[test]
    fn test_prompt_names_all_statuses() {
        for status in ["Healthy", "Needs Attention", "Diseased"] {
            assert!(ANALYSIS_PROMPT.contains(status));
        }
        assert!(ANALYSIS_PROMPT.contains("care_tips"));
    }
}
