use serde::{Deserialize, Serialize};

use crate::scanner::{AnalysisResult, HealthAnalysis, HealthStatus};

/// The fields of a plant kept in the garden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantRecord {
    pub common_name: String,
    pub species_name: String,
    pub description: String,
    pub image_url: String,
    pub health_status: HealthStatus,
    pub health_analysis: HealthAnalysis,
    pub care_tips: Vec<String>,
}

impl From<&AnalysisResult> for PlantRecord {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            common_name: result.common_name.clone(),
            species_name: result.species_name.clone(),
            description: result.description.clone(),
            image_url: result.image_url.clone(),
            health_status: result.health_status,
            health_analysis: result.health_analysis.clone(),
            care_tips: result.care_tips.clone(),
        }
    }
}

impl PlantRecord {
    /// Whether the common or species name contains `term` ignoring case.
    /// `term` must already be lowercased.
    pub fn matches_lowercase(&self, term: &str) -> bool {
        self.common_name.to_lowercase().contains(term)
            || self.species_name.to_lowercase().contains(term)
    }
}

/// A record as returned by a plant store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPlant {
    pub id: String,
    /// RFC 3339
    pub created_date: String,
    #[serde(flatten)]
    pub record: PlantRecord,
}

/// Sort order for listing saved plants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListOrder {
    /// `-created_date`
    #[default]
    NewestFirst,
    /// `created_date`
    OldestFirst,
}

impl ListOrder {
    /// Sort key in the entity API's notation.
    pub fn sort_key(&self) -> &'static str {
        match self {
            ListOrder::NewestFirst => "-created_date",
            ListOrder::OldestFirst => "created_date",
        }
    }

    pub fn from_sort_key(key: &str) -> Option<Self> {
        match key.trim() {
            "-created_date" => Some(ListOrder::NewestFirst),
            "created_date" => Some(ListOrder::OldestFirst),
            _ => None,
        }
    }
}
