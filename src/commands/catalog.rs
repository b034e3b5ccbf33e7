use tauri::State;

use crate::app::AppState;
use crate::catalog::CatalogPlant;

/// Search-page query over the built-in catalog in the active language.
/// `category` and `difficulty` accept "all".
#[tauri::command]
pub fn search_catalog(
    state: State<'_, AppState>,
    query: String,
    category: Option<String>,
    difficulty: Option<String>,
) -> Vec<CatalogPlant> {
    state.search_catalog(
        &query,
        category.as_deref().unwrap_or("all"),
        difficulty.as_deref().unwrap_or("all"),
    )
}

#[tauri::command]
pub fn get_catalog_plant(state: State<'_, AppState>, id: String) -> Result<CatalogPlant, String> {
    state
        .catalog_plant(&id)
        .ok_or_else(|| format!("Plant not found: {}", id))
}
