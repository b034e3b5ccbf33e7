//! Language preference commands and the Tauri-backed preference store.

use std::collections::BTreeMap;

use tauri::{AppHandle, State};
use tauri_plugin_store::StoreExt;
use tracing::{info, warn};

use crate::app::AppState;
use crate::preferences::{Language, PreferenceStore};

/// Preferences kept in a `tauri-plugin-store` file.
pub struct TauriPreferenceStore {
    app: AppHandle,
    file: String,
}

impl TauriPreferenceStore {
    pub fn new(app: AppHandle, file: impl Into<String>) -> Self {
        Self {
            app,
            file: file.into(),
        }
    }
}

impl PreferenceStore for TauriPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, String> {
        let store = self.app.store(&self.file).map_err(|e| {
            warn!("Failed to open store: {}", e);
            e.to_string()
        })?;
        Ok(store.get(key).and_then(|v| v.as_str().map(|s| s.to_string())))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        info!("Setting preference: {} = {}", key, value);
        let store = self.app.store(&self.file).map_err(|e| {
            warn!("Failed to open store: {}", e);
            e.to_string()
        })?;
        store.set(key, serde_json::json!(value));
        store.save().map_err(|e| {
            warn!("Failed to save store: {}", e);
            e.to_string()
        })
    }
}

/// The active language code.
#[tauri::command]
pub fn get_language(state: State<'_, AppState>) -> String {
    state.language().code().to_string()
}

/// Switch language. Unknown codes select English.
#[tauri::command]
pub async fn set_language(state: State<'_, AppState>, code: String) -> Result<String, String> {
    let language = Language::from_code(&code);
    state.set_language(language).await?;
    Ok(language.code().to_string())
}

/// UI strings in the active language.
#[tauri::command]
pub fn get_translations(state: State<'_, AppState>) -> BTreeMap<&'static str, &'static str> {
    state.translations()
}
