//! Tauri commands for the scan page.
//!
//! The frontend reads the selected file with FileReader and sends it as
//! base64 together with its declared media type and name.

use base64::Engine;
use serde::Deserialize;
use tauri::State;
use tracing::info;

use crate::app::AppState;
use crate::scanner::{AnalysisResult, ImageFile, ScanStage};

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub image_base64: String,
    pub media_type: String,
    pub file_name: String,
}

/// Normalize, upload and analyze one plant photo.
#[tauri::command]
pub async fn scan_plant(
    state: State<'_, AppState>,
    request: ScanRequest,
) -> Result<AnalysisResult, String> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(request.image_base64.trim())
        .map_err(|e| format!("Invalid base64 image data: {}", e))?;

    info!("scan_plant: '{}' ({} bytes)", request.file_name, bytes.len());
    let file = ImageFile::new(bytes, request.media_type, request.file_name);
    Ok(state.scan(file).await?)
}

/// Save the presented result to the garden. Returns the new plant id.
#[tauri::command]
pub async fn save_scanned_plant(state: State<'_, AppState>) -> Result<String, String> {
    Ok(state.save_scan().await?)
}

/// "Scan another": drop the current result or error.
#[tauri::command]
pub fn reset_scan(state: State<'_, AppState>) -> Result<(), String> {
    Ok(state.reset_scan()?)
}

#[tauri::command]
pub fn cancel_scan(state: State<'_, AppState>) -> bool {
    state.cancel_scan()
}

#[tauri::command]
pub fn get_scan_stage(state: State<'_, AppState>) -> ScanStage {
    state.scan_stage()
}
