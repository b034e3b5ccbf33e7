use tauri::State;
use tracing::info;

use crate::app::AppState;
use crate::garden::{ListOrder, SavedPlant};

/// Saved plants. `sort` uses the entity API notation (`-created_date`
/// newest first, `created_date` oldest first); default newest first.
#[tauri::command]
pub async fn list_garden(
    state: State<'_, AppState>,
    sort: Option<String>,
) -> Result<Vec<SavedPlant>, String> {
    let order = match sort.as_deref() {
        Some(key) => ListOrder::from_sort_key(key).ok_or_else(|| format!("Unknown sort key: {}", key))?,
        None => ListOrder::default(),
    };
    let plants = state.list_garden(order).await?;
    info!("Listed {} garden plants", plants.len());
    Ok(plants)
}

#[tauri::command]
pub async fn search_garden(
    state: State<'_, AppState>,
    term: String,
) -> Result<Vec<SavedPlant>, String> {
    state.search_garden(&term).await
}
