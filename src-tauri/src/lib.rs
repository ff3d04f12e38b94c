#![recursion_limit = "256"]

mod controller;
mod csv_loader;

pub mod error;
pub mod form;
pub mod ml;
pub mod model;
pub mod types;

pub use controller::{present, InlineWarning, PredictionController, ResultColor, ResultDialog, SubmitOutcome};
pub use csv_loader::load_forms;

use form::FormLayout;
use model::AppConfig;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Mutex;
use tauri::State;
use tracing::{error, info};
use types::PredictionForm;

pub struct AppState {
    controller: Mutex<PredictionController>,
    model_path: PathBuf,
}

/// モデルの読み込み状態
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    pub loaded: bool,
    pub model_path: String,
    /// 読み込み済みならモデル名、失敗時はその理由
    pub detail: String,
}

/// ログ出力を初期化（RUST_LOG で上書き可能）
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("heart_disease_predictor_lib=info,inspect_model=info"));
    // テストなどで二重に初期化された場合は無視する
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}

/// 設定に従ってモデルを読み込み、コントローラを作成
///
/// 読み込みに失敗してもアプリは起動し、予測時にエラーを表示する。
pub fn build_controller(config: &AppConfig) -> (PredictionController, PathBuf) {
    let current_dir = std::env::current_dir().unwrap_or_default();
    let model_path = config.model.resolve_path(&current_dir);

    let controller = match ml::load_classifier(&model_path, config.device_type) {
        Ok(classifier) => PredictionController::new(classifier),
        Err(e) => {
            error!("[build_controller] モデルの読み込みに失敗しました: {:#}", e);
            PredictionController::without_model(format!("{:#}", e))
        }
    };

    (controller, model_path)
}

// Tauri commands
#[tauri::command]
fn get_form_layout(state: State<AppState>) -> Result<FormLayout, String> {
    let controller = state.controller.lock().map_err(|e| e.to_string())?;
    Ok(controller.layout())
}

#[tauri::command]
fn submit_prediction(form: PredictionForm, state: State<AppState>) -> Result<SubmitOutcome, String> {
    let controller = state.controller.lock().map_err(|e| e.to_string())?;
    let outcome = controller.submit(&form);

    let kind = match &outcome {
        SubmitOutcome::Warning(_) => "warning",
        SubmitOutcome::Dialog(_) => "dialog",
    };
    info!("[submit_prediction] 結果: {}", kind);
    Ok(outcome)
}

#[tauri::command]
fn get_model_status(state: State<AppState>) -> Result<ModelStatus, String> {
    let controller = state.controller.lock().map_err(|e| e.to_string())?;
    Ok(ModelStatus {
        loaded: controller.is_model_loaded(),
        model_path: state.model_path.display().to_string(),
        detail: controller.model_detail(),
    })
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    init_tracing();

    let config = AppConfig::load_or_default();
    config.log_summary();

    let (controller, model_path) = build_controller(&config);
    let app_state = AppState {
        controller: Mutex::new(controller),
        model_path,
    };

    tauri::Builder::default()
        .manage(app_state)
        .invoke_handler(tauri::generate_handler![
            get_form_layout,
            submit_prediction,
            get_model_status,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
