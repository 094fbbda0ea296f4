use tauri::State;

use crate::decoder::Viewport;
use crate::scanner::{ScanController, ScanSession};
use crate::settings::ScannerSettings;

use super::AppState;

fn controller_from_state(state: &State<'_, AppState>) -> ScanController {
    state.scanner.clone()
}

#[tauri::command]
pub async fn scanner_mount(
    state: State<'_, AppState>,
    width: u32,
    height: u32,
) -> Result<(), String> {
    let controller = controller_from_state(&state);
    controller
        .mount(Viewport::new(width, height))
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn scanner_unmount(state: State<'_, AppState>) -> Result<(), String> {
    let controller = controller_from_state(&state);
    controller.unmount().map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn scanner_set_visibility(
    state: State<'_, AppState>,
    visible: bool,
) -> Result<(), String> {
    let controller = controller_from_state(&state);
    controller.set_visibility(visible).map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn scanner_retry(state: State<'_, AppState>) -> Result<(), String> {
    let controller = controller_from_state(&state);
    controller.retry().map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_scanner_state(state: State<'_, AppState>) -> Result<ScanSession, String> {
    let controller = controller_from_state(&state);
    controller.snapshot().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_scanner_settings(state: State<'_, AppState>) -> Result<ScannerSettings, String> {
    Ok(state.settings.scanner())
}

#[tauri::command]
pub fn set_scanner_settings(
    settings: ScannerSettings,
    state: State<'_, AppState>,
) -> Result<(), String> {
    state
        .settings
        .update_scanner(settings.clone())
        .map_err(|e| e.to_string())?;

    state.chime.set_enabled(settings.chime_enabled);
    state
        .scanner
        .configure(settings.scanner_options())
        .map_err(|e| e.to_string())
}
