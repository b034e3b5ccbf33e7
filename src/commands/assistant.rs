use tauri::State;

use crate::app::AppState;

/// Ask the gardening assistant. Replies in the active language.
#[tauri::command]
pub async fn ask_assistant(state: State<'_, AppState>, question: String) -> Result<String, String> {
    state.ask_assistant(&question).await
}
