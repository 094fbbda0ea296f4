//! Tauri shell hosting the scanner in a desktop window.

mod commands;

use std::sync::Arc;

use serde::Serialize;
use tauri::{AppHandle, Emitter, Manager};

use crate::camera::NokhwaBackend;
use crate::decoder::CompositeEngine;
use crate::host::{ChimeAcknowledger, HostEvents};
use crate::scanner::{ScanController, ScanSession, ScannerParts};
use crate::settings::SettingsStore;
use crate::utils::init_logging;

use commands::{
    get_scanner_settings, get_scanner_state, scanner_mount, scanner_retry,
    scanner_set_visibility, scanner_unmount, set_scanner_settings,
};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

pub(crate) struct AppState {
    pub(crate) scanner: ScanController,
    pub(crate) settings: SettingsStore,
    pub(crate) chime: Arc<ChimeAcknowledger>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScanConfirmedPayload {
    payload: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScanErrorPayload {
    message: String,
}

/// Forwards scanner events to the webview.
struct TauriHost {
    app_handle: AppHandle,
}

impl TauriHost {
    fn emit<S: Serialize + Clone>(&self, event: &str, payload: S) {
        if let Err(err) = self.app_handle.emit(event, payload) {
            log_warn!("failed to emit {event}: {err}");
        }
    }
}

impl HostEvents for TauriHost {
    fn on_scan(&self, payload: String) {
        self.emit("scan-confirmed", ScanConfirmedPayload { payload });
    }

    fn on_error(&self, message: String) {
        self.emit("scan-error", ScanErrorPayload { message });
    }

    fn on_state_changed(&self, session: &ScanSession) {
        self.emit("scanner-state-changed", session.clone());
    }
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    init_logging();
    log_info!("StockScan starting up...");

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let result = (|| -> anyhow::Result<()> {
                let app_data_dir = app
                    .path()
                    .app_data_dir()
                    .map_err(|err| anyhow::anyhow!(err))?;
                std::fs::create_dir_all(&app_data_dir)?;

                let settings = SettingsStore::new(app_data_dir.join("settings.json"))?;
                let initial = settings.scanner();
                let chime = Arc::new(ChimeAcknowledger::new(initial.chime_enabled));

                let parts = ScannerParts {
                    backend: Arc::new(NokhwaBackend::new()),
                    engine: Arc::new(CompositeEngine::standard()),
                    host: Arc::new(TauriHost {
                        app_handle: app.handle().clone(),
                    }),
                    acknowledger: chime.clone(),
                };
                let options = initial.scanner_options();
                let scanner = tauri::async_runtime::block_on(async move {
                    ScanController::spawn(parts, options)
                });

                app.manage(AppState {
                    scanner,
                    settings,
                    chime,
                });
                Ok(())
            })();

            result.map_err(|err| err.into())
        })
        .invoke_handler(tauri::generate_handler![
            scanner_mount,
            scanner_unmount,
            scanner_set_visibility,
            scanner_retry,
            get_scanner_state,
            get_scanner_settings,
            set_scanner_settings,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
