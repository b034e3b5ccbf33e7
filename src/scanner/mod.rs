//! Plant photo scanning.
//!
//! Provides the pipeline behind the scan page:
//! 1. Normalize the selected image to JPEG or PNG
//! 2. Upload it and ask the analysis service to identify the plant
//! 3. Validate and repair the AI response into an [`AnalysisResult`]
//! 4. Save the result to the garden on request

pub mod normalizer;
pub mod orchestrator;
pub mod prompts;
pub mod types;
pub mod validation;

pub use normalizer::{normalize_image, normalize_image_async};
pub use orchestrator::{ScanServices, ScanSession, ScanSettings, ScanStage, ScanState};
pub use types::{
    AnalysisRequest, AnalysisResult, HealthAnalysis, HealthIssue, HealthStatus, ImageFile,
    NormalizedImage,
};
pub use validation::parse_analysis_response;
