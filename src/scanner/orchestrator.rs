//! The scan session: normalize, upload, analyze, present, save.
//!
//! A [`ScanSession`] runs at most one scan at a time. Each run moves through
//! [`ScanStage`]s that are published on a watch channel so a UI can follow
//! progress without polling. Collaborators are injected as trait objects.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::normalizer::{normalize_image_async, DEFAULT_JPEG_QUALITY};
use super::prompts::{plant_analysis_json_schema, ANALYSIS_PROMPT};
use super::types::{AnalysisRequest, AnalysisResult, ImageFile};
use super::validation::parse_analysis_response;
use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::garden::PlantRecord;
use crate::services::{AnalysisService, PlantStore, UploadService};

/// Default upload ceiling: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Where a session currently is, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStage {
    Idle,
    Normalizing,
    Uploading,
    Analyzing,
    Presenting,
    Saving,
    Saved,
    Failed,
}

impl ScanStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStage::Idle => "idle",
            ScanStage::Normalizing => "normalizing",
            ScanStage::Uploading => "uploading",
            ScanStage::Analyzing => "analyzing",
            ScanStage::Presenting => "presenting",
            ScanStage::Saving => "saving",
            ScanStage::Saved => "saved",
            ScanStage::Failed => "failed",
        }
    }
}

impl fmt::Display for ScanStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full session state.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanState {
    Idle,
    Normalizing,
    Uploading,
    Analyzing,
    Presenting(AnalysisResult),
    Saving(AnalysisResult),
    Saved {
        result: AnalysisResult,
        plant_id: String,
    },
    Failed(ScanError),
}

impl ScanState {
    pub fn stage(&self) -> ScanStage {
        match self {
            ScanState::Idle => ScanStage::Idle,
            ScanState::Normalizing => ScanStage::Normalizing,
            ScanState::Uploading => ScanStage::Uploading,
            ScanState::Analyzing => ScanStage::Analyzing,
            ScanState::Presenting(_) => ScanStage::Presenting,
            ScanState::Saving(_) => ScanStage::Saving,
            ScanState::Saved { .. } => ScanStage::Saved,
            ScanState::Failed(_) => ScanStage::Failed,
        }
    }

    /// The analysis being shown or saved, if any.
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            ScanState::Presenting(result)
            | ScanState::Saving(result)
            | ScanState::Saved { result, .. } => Some(result),
            _ => None,
        }
    }
}

/// External collaborators of a session.
#[derive(Clone)]
pub struct ScanServices {
    pub uploader: Arc<dyn UploadService>,
    pub analyzer: Arc<dyn AnalysisService>,
    pub store: Arc<dyn PlantStore>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSettings {
    pub max_upload_bytes: usize,
    pub jpeg_quality: u8,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl From<&ScanConfig> for ScanSettings {
    fn from(config: &ScanConfig) -> Self {
        Self {
            max_upload_bytes: config.max_upload_bytes,
            jpeg_quality: config.jpeg_quality,
        }
    }
}

pub struct ScanSession {
    services: ScanServices,
    settings: ScanSettings,
    state: ScanState,
    stage_tx: watch::Sender<ScanStage>,
}

impl ScanSession {
    pub fn new(services: ScanServices, settings: ScanSettings) -> Self {
        let (stage_tx, _) = watch::channel(ScanStage::Idle);
        Self {
            services,
            settings,
            state: ScanState::Idle,
            stage_tx,
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn stage(&self) -> ScanStage {
        self.state.stage()
    }

    pub fn settings(&self) -> ScanSettings {
        self.settings
    }

    /// Receiver that observes every stage change.
    pub fn subscribe(&self) -> watch::Receiver<ScanStage> {
        self.stage_tx.subscribe()
    }

    /// Run one scan to completion.
    pub async fn scan(&mut self, file: ImageFile) -> Result<AnalysisResult, ScanError> {
        self.scan_with_cancel(file, CancellationToken::new()).await
    }

    /// Run one scan, abandoning it when `cancel` fires.
    ///
    /// A cancelled run returns [`ScanError::Cancelled`] and leaves the
    /// session `Idle`; whatever the collaborators were doing is discarded.
    pub async fn scan_with_cancel(
        &mut self,
        file: ImageFile,
        cancel: CancellationToken,
    ) -> Result<AnalysisResult, ScanError> {
        if self.state != ScanState::Idle {
            let stage = self.stage();
            warn!("Scan rejected: session is {}", stage);
            return Err(ScanError::SessionBusy {
                stage: stage.to_string(),
            });
        }

        info!("Starting scan of '{}' ({} bytes)", file.file_name, file.size());

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ScanError::Cancelled),
            outcome = self.run(file) => outcome,
        };

        match outcome {
            Ok(result) => {
                info!(
                    "Scan complete: {} ({}), status {}",
                    result.common_name, result.species_name, result.health_status
                );
                self.transition(ScanState::Presenting(result.clone()));
                Ok(result)
            }
            Err(ScanError::Cancelled) => {
                info!("Scan cancelled");
                self.transition(ScanState::Idle);
                Err(ScanError::Cancelled)
            }
            Err(e) => {
                error!("Scan failed: {}", e);
                self.transition(ScanState::Failed(e.clone()));
                Err(e)
            }
        }
    }

    async fn run(&mut self, file: ImageFile) -> Result<AnalysisResult, ScanError> {
        self.transition(ScanState::Normalizing);
        let image = normalize_image_async(file, self.settings.jpeg_quality).await?;

        if image.size() > self.settings.max_upload_bytes {
            warn!(
                "'{}' is {} bytes, over the {} byte limit",
                image.file_name,
                image.size(),
                self.settings.max_upload_bytes
            );
            return Err(ScanError::FileTooLarge {
                size: image.size(),
                limit: self.settings.max_upload_bytes,
            });
        }

        self.transition(ScanState::Uploading);
        let uploaded = self
            .services
            .uploader
            .upload(&image.bytes, &image.file_name, &image.media_type)
            .await
            .map_err(ScanError::UploadFailed)?;
        let file_url = uploaded.file_url.trim();
        if file_url.is_empty() {
            return Err(ScanError::UploadFailed(
                "upload returned an empty URL".to_string(),
            ));
        }

        self.transition(ScanState::Analyzing);
        let request = AnalysisRequest {
            file_url: file_url.to_string(),
            prompt: ANALYSIS_PROMPT.to_string(),
            response_schema: plant_analysis_json_schema(),
        };
        let raw = self
            .services
            .analyzer
            .invoke(
                &request.prompt,
                std::slice::from_ref(&request.file_url),
                Some(&request.response_schema),
            )
            .await
            .map_err(ScanError::AnalysisIncomplete)?;

        let result = parse_analysis_response(&raw, &request.file_url)?;
        if result.was_repaired() {
            warn!("Analysis repaired with defaults: {}", result.repaired_fields.join(", "));
        }
        Ok(result)
    }

    /// Save the presented result to the plant store.
    ///
    /// On failure the session goes back to presenting the same result so the
    /// user can retry.
    pub async fn save(&mut self) -> Result<String, ScanError> {
        let result = match &self.state {
            ScanState::Presenting(result) => result.clone(),
            other => {
                return Err(ScanError::SaveFailed(format!(
                    "nothing to save while {}",
                    other.stage()
                )))
            }
        };

        self.transition(ScanState::Saving(result.clone()));
        let record = PlantRecord::from(&result);

        match self.services.store.create(&record).await {
            Ok(plant_id) => {
                info!("Saved {} as {}", result.common_name, plant_id);
                self.transition(ScanState::Saved {
                    result,
                    plant_id: plant_id.clone(),
                });
                Ok(plant_id)
            }
            Err(e) => {
                error!("Failed to save {}: {}", result.common_name, e);
                self.transition(ScanState::Presenting(result));
                Err(ScanError::SaveFailed(e))
            }
        }
    }

    /// Discard the current result or failure and get ready for another scan.
    pub fn reset(&mut self) {
        if self.state != ScanState::Idle {
            info!("Resetting scan session from {}", self.stage());
            self.transition(ScanState::Idle);
        }
    }

    fn transition(&mut self, next: ScanState) {
        let stage = next.stage();
        self.state = next;
        self.stage_tx.send_replace(stage);
    }
}
