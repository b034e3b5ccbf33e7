//! Shared application state behind the desktop commands.
//!
//! Owns the single scan session, the garden, the catalog, the language
//! context, page navigation and the assistant chat. Everything here is usable without the
//! desktop shell.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::assistant::Assistant;
use crate::catalog::{CatalogPlant, PlantCatalog};
use crate::config::PlantifyConfig;
use crate::error::ScanError;
use crate::garden::{ListOrder, SavedPlant, SqlitePlantStore};
use crate::i18n;
use crate::navigation::{Navigator, Page};
use crate::preferences::{Language, LanguageContext, PreferenceStore};
use crate::scanner::{AnalysisResult, ImageFile, ScanServices, ScanSession, ScanSettings, ScanStage};
use crate::services::{HttpAnalysisService, HttpPlantStore, HttpUploadService, PlantStore};

pub struct AppState {
    session: tokio::sync::Mutex<ScanSession>,
    stages: watch::Receiver<ScanStage>,
    scan_cancel: Mutex<Option<CancellationToken>>,
    services: ScanServices,
    catalog: PlantCatalog,
    preferences: Arc<dyn PreferenceStore>,
    language: Mutex<LanguageContext>,
    navigator: Mutex<Navigator>,
    assistant: tokio::sync::Mutex<Assistant>,
}

impl AppState {
    /// Build the production state: HTTP services from `config` and the
    /// garden in `data_dir` (or remote, per `storage.remote_garden`).
    pub fn new(
        config: &PlantifyConfig,
        data_dir: &Path,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Result<Self, String> {
        let store: Arc<dyn PlantStore> = if config.storage.remote_garden {
            info!("Garden: remote ({})", config.services.entity_url);
            Arc::new(HttpPlantStore::from_config(config)?)
        } else {
            let db_path = data_dir.join(&config.storage.garden_db);
            info!("Garden: {}", db_path.display());
            Arc::new(SqlitePlantStore::new(db_path))
        };

        let services = ScanServices {
            uploader: Arc::new(HttpUploadService::from_config(config)?),
            analyzer: Arc::new(HttpAnalysisService::from_config(config)?),
            store,
        };

        Self::with_services(
            services,
            ScanSettings::from(&config.scan),
            PlantCatalog::embedded()?,
            preferences,
        )
    }

    pub fn with_services(
        services: ScanServices,
        settings: ScanSettings,
        catalog: PlantCatalog,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Result<Self, String> {
        let language = LanguageContext::load(preferences.as_ref());
        let session = ScanSession::new(services.clone(), settings);
        let stages = session.subscribe();
        let assistant = Assistant::new(services.analyzer.clone(), language.language());

        Ok(Self {
            session: tokio::sync::Mutex::new(session),
            stages,
            scan_cancel: Mutex::new(None),
            services,
            catalog,
            preferences,
            language: Mutex::new(language),
            navigator: Mutex::new(Navigator::new()),
            assistant: tokio::sync::Mutex::new(assistant),
        })
    }

    fn lock_session(&self) -> Result<tokio::sync::MutexGuard<'_, ScanSession>, ScanError> {
        self.session.try_lock().map_err(|_| ScanError::SessionBusy {
            stage: self.scan_stage().to_string(),
        })
    }

    /// Run a scan. Fails with `SessionBusy` while another scan or save runs.
    pub async fn scan(&self, file: ImageFile) -> Result<AnalysisResult, ScanError> {
        let mut session = self.lock_session()?;

        let token = CancellationToken::new();
        *self.scan_cancel.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());

        let outcome = session.scan_with_cancel(file, token).await;

        self.scan_cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        outcome
    }

    /// Cancel the running scan. Returns false when nothing was running.
    pub fn cancel_scan(&self) -> bool {
        match self
            .scan_cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn scan_stage(&self) -> ScanStage {
        *self.stages.borrow()
    }

    pub fn subscribe_stages(&self) -> watch::Receiver<ScanStage> {
        self.stages.clone()
    }

    pub async fn save_scan(&self) -> Result<String, ScanError> {
        self.lock_session()?.save().await
    }

    pub fn reset_scan(&self) -> Result<(), ScanError> {
        self.lock_session()?.reset();
        Ok(())
    }

    pub async fn list_garden(&self, order: ListOrder) -> Result<Vec<SavedPlant>, String> {
        self.services.store.list(order).await
    }

    pub async fn search_garden(&self, term: &str) -> Result<Vec<SavedPlant>, String> {
        self.services.store.search(term).await
    }

    /// Catalog search-page query in the current language.
    pub fn search_catalog(&self, query: &str, category: &str, difficulty: &str) -> Vec<CatalogPlant> {
        self.catalog
            .filter(query, category, difficulty, self.language())
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn catalog_plant(&self, id: &str) -> Option<CatalogPlant> {
        self.catalog.get_by_id(id).cloned()
    }

    pub fn language(&self) -> Language {
        self.language
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .language()
    }

    /// Persist and switch the language. The assistant chat restarts in the
    /// new language.
    pub async fn set_language(&self, language: Language) -> Result<(), String> {
        self.language
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_language(self.preferences.as_ref(), language)?;

        *self.assistant.lock().await = Assistant::new(self.services.analyzer.clone(), language);
        Ok(())
    }

    /// UI strings in the current language.
    pub fn translations(&self) -> BTreeMap<&'static str, &'static str> {
        i18n::translations(self.language())
    }

    pub fn navigation(&self) -> Navigator {
        self.navigator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Open `page` and return the updated navigation state.
    pub fn navigate(&self, page: Page, plant_id: Option<&str>) -> Result<Navigator, String> {
        let mut navigator = self.navigator.lock().unwrap_or_else(PoisonError::into_inner);
        if page == Page::PlantDetail {
            if let Some(id) = plant_id.map(str::trim) {
                if self.catalog.get_by_id(id).is_none() {
                    return Err(format!("Unknown plant: {}", id));
                }
            }
        }
        navigator.navigate_to(page, plant_id)?;
        Ok(navigator.clone())
    }

    pub fn go_back(&self) -> Navigator {
        let mut navigator = self.navigator.lock().unwrap_or_else(PoisonError::into_inner);
        navigator.back();
        navigator.clone()
    }

    pub async fn ask_assistant(&self, question: &str) -> Result<String, String> {
        self.assistant.lock().await.ask(question).await
    }
}
