pub mod app;
pub mod assistant;
pub mod catalog;
#[cfg(feature = "desktop")]
mod commands;
pub mod config;
pub mod error;
pub mod garden;
pub mod i18n;
pub mod navigation;
pub mod preferences;
pub mod scanner;
pub mod services;

pub use app::AppState;
pub use config::PlantifyConfig;
pub use error::ScanError;
pub use scanner::{AnalysisResult, ImageFile, ScanSession, ScanStage};

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// `info` level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

#[cfg(feature = "desktop")]
pub fn run() {
    use std::sync::Arc;

    use tauri::{Emitter, Manager};

    init_tracing();

    tauri::Builder::default()
        .plugin(tauri_plugin_store::Builder::new().build())
        .setup(|app| {
            let config = PlantifyConfig::resolve()?;
            let data_dir = app.path().app_data_dir()?;
            let preferences = Arc::new(commands::config::TauriPreferenceStore::new(
                app.handle().clone(),
                config.storage.preferences_file.clone(),
            ));
            let state = AppState::new(&config, &data_dir, preferences)?;

            // Forward scan stages to the frontend
            let mut stages = state.subscribe_stages();
            let handle = app.handle().clone();
            tauri::async_runtime::spawn(async move {
                while stages.changed().await.is_ok() {
                    let stage = *stages.borrow_and_update();
                    if let Err(e) = handle.emit("scan-stage", stage) {
                        tracing::warn!("Failed to emit scan stage: {}", e);
                    }
                }
            });

            app.manage(state);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::keychain::set_api_key,
            commands::keychain::get_api_key,
            commands::keychain::delete_api_key,
            commands::config::get_language,
            commands::config::set_language,
            commands::config::get_translations,
            commands::navigation::get_navigation,
            commands::navigation::navigate,
            commands::navigation::go_back,
            commands::scan::scan_plant,
            commands::scan::save_scanned_plant,
            commands::scan::reset_scan,
            commands::scan::cancel_scan,
            commands::scan::get_scan_stage,
            commands::garden::list_garden,
            commands::garden::search_garden,
            commands::catalog::search_catalog,
            commands::catalog::get_catalog_plant,
            commands::assistant::ask_assistant,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
