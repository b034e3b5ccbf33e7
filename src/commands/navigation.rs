//! Page routing commands.

use tauri::State;

use crate::app::AppState;
use crate::navigation::{Navigator, Page};

#[tauri::command]
pub fn get_navigation(state: State<'_, AppState>) -> Navigator {
    state.navigation()
}

/// Open the page with the given slug. `plant-detail` needs a catalog plant id.
#[tauri::command]
pub fn navigate(
    state: State<'_, AppState>,
    page: String,
    plant_id: Option<String>,
) -> Result<Navigator, String> {
    let page = Page::from_slug(&page).ok_or_else(|| format!("Unknown page: {}", page))?;
    state.navigate(page, plant_id.as_deref())
}

#[tauri::command]
pub fn go_back(state: State<'_, AppState>) -> Navigator {
    state.go_back()
}
