//! External collaborators of the scan pipeline.
//!
//! Each service is a trait so the pipeline can run against the HTTP
//! implementations in [`http`], the local garden store, or test doubles.
//! Errors are plain strings; the pipeline classifies them.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::garden::{ListOrder, PlantRecord, SavedPlant};

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub file_url: String,
}

/// Stores a file and returns a durable URL for it.
#[async_trait]
pub trait UploadService: Send + Sync {
    async fn upload(
        &self,
        bytes: &[u8],
        file_name: &str,
        media_type: &str,
    ) -> Result<UploadedFile, String>;
}

/// Runs an LLM prompt, optionally over uploaded files and with a target
/// response schema. The returned JSON is not trusted to match the schema.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn invoke(
        &self,
        prompt: &str,
        file_urls: &[String],
        response_schema: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value, String>;
}

/// Entity storage for saved plants.
#[async_trait]
pub trait PlantStore: Send + Sync {
    /// Persist a record and return its id.
    async fn create(&self, record: &PlantRecord) -> Result<String, String>;

    async fn list(&self, order: ListOrder) -> Result<Vec<SavedPlant>, String>;

    /// Newest-first plants whose common or species name contains `term`,
    /// ignoring case. A blank term lists everything.
    async fn search(&self, term: &str) -> Result<Vec<SavedPlant>, String> {
        let term = term.trim().to_lowercase();
        let plants = self.list(ListOrder::NewestFirst).await?;
        if term.is_empty() {
            return Ok(plants);
        }
        Ok(plants
            .into_iter()
            .filter(|p| p.record.matches_lowercase(&term))
            .collect())
    }
}

pub use http::{ApiKey, HttpAnalysisService, HttpPlantStore, HttpUploadService};
