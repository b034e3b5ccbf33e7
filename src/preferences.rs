//! User preferences and the active UI language.
//!
//! Preferences are string key/value pairs behind [`PreferenceStore`]. The
//! desktop app backs them with the Tauri store plugin; everything else uses
//! [`JsonPreferenceStore`], a flat JSON object on disk.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Preference key holding the language code.
pub const LANGUAGE_KEY: &str = "language";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Bn,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Hi, Language::Bn];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Bn => "bn",
        }
    }

    /// Parse a language code. Unknown codes fall back to English.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "hi" => Language::Hi,
            "bn" => Language::Bn,
            "en" => Language::En,
            other => {
                if !other.is_empty() {
                    warn!("Unknown language code '{}', using English", other);
                }
                Language::En
            }
        }
    }

    /// English name of the language.
    pub fn name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi",
            Language::Bn => "Bengali",
        }
    }

    /// Name of the language in its own script.
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "हिंदी",
            Language::Bn => "বাংলা",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, String>;
    fn set(&self, key: &str, value: &str) -> Result<(), String>;
}

/// Preferences kept as a JSON object in a single file.
///
/// A missing file reads as empty; it is created on the first `set`.
pub struct JsonPreferenceStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonPreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<serde_json::Map<String, serde_json::Value>, String> {
        if !self.path.exists() {
            return Ok(serde_json::Map::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| format!("Failed to read preferences {}: {}", self.path.display(), e))?;
        if content.trim().is_empty() {
            return Ok(serde_json::Map::new());
        }
        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse preferences {}: {}", self.path.display(), e))
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, String> {
        let _guard = self.lock.lock().map_err(|e| format!("Preferences lock poisoned: {}", e))?;
        let map = self.read_map()?;
        Ok(map.get(key).and_then(|v| v.as_str().map(|s| s.to_string())))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        let _guard = self.lock.lock().map_err(|e| format!("Preferences lock poisoned: {}", e))?;
        let mut map = self.read_map()?;
        map.insert(key.to_string(), serde_json::json!(value));

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }
        let json = serde_json::to_string_pretty(&map)
            .map_err(|e| format!("Failed to serialize preferences: {}", e))?;
        std::fs::write(&self.path, json)
            .map_err(|e| format!("Failed to write preferences {}: {}", self.path.display(), e))
    }
}

/// The language every localized view reads from.
///
/// Loaded once at startup; changes are written through to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LanguageContext {
    language: Language,
}

impl LanguageContext {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    /// Read the saved language. Missing, unknown or unreadable values give English.
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let language = match store.get(LANGUAGE_KEY) {
            Ok(Some(code)) => Language::from_code(&code),
            Ok(None) => Language::default(),
            Err(e) => {
                warn!("Failed to load language preference: {}", e);
                Language::default()
            }
        };
        info!("Language: {}", language);
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Persist `language`, then switch to it. A failed write leaves the
    /// current language unchanged.
    pub fn set_language(
        &mut self,
        store: &dyn PreferenceStore,
        language: Language,
    ) -> Result<(), String> {
        store.set(LANGUAGE_KEY, language.code())?;
        info!("Language changed: {} -> {}", self.language, language);
        self.language = language;
        Ok(())
    }
}
