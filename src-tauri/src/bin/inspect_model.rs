//! モデルパッケージの確認用バイナリ
//!
//! ```bash
//! cargo run --bin inspect_model -- info models/heart_disease_model.tar.gz
//! cargo run --bin inspect_model -- predict models/heart_disease_model.tar.gz --csv patients.csv
//! cargo run --bin inspect_model -- pack-linear coefficients.json models/heart_disease_model.tar.gz
//! cargo run --bin inspect_model -- init-config --model models/heart_disease_model.tar.gz
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use heart_disease_predictor_lib::ml::{load_classifier, LinearClassifier};
use heart_disease_predictor_lib::model::{
    load_metadata, print_metadata_info, save_model_with_metadata, AppConfig, DeviceType,
    InferenceConfig, ModelKind, ModelMetadata,
};
use heart_disease_predictor_lib::types::PredictionForm;
use heart_disease_predictor_lib::{init_tracing, load_forms, PredictionController, SubmitOutcome};

#[derive(Parser)]
#[command(name = "inspect_model")]
#[command(about = "Inspect heart disease model packages and run predictions")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print package metadata and check the feature order
    Info {
        #[arg(value_name = "MODEL")]
        model: PathBuf,
    },
    /// Run predictions through the same controller as the form
    Predict {
        #[arg(value_name = "MODEL")]
        model: PathBuf,
        /// CSV with one patient per row (header = field keys); defaults to a reference patient
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Use the WGPU backend for MLP packages
        #[arg(long)]
        gpu: bool,
    },
    /// Package exported linear coefficients ({"coefficients": [...], "intercept": ...})
    PackLinear {
        #[arg(value_name = "JSON")]
        coefficients: PathBuf,
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Write an app config file with default settings
    InitConfig {
        /// Destination (defaults to the path the app reads)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Model package path to record
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        gpu: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    match args.command {
        Command::Info { model } => show_info(&model),
        Command::Predict { model, csv, gpu } => predict(&model, csv, gpu),
        Command::PackLinear {
            coefficients,
            output,
            description,
        } => pack_linear(&coefficients, &output, description),
        Command::InitConfig { output, model, gpu } => init_config(output, model, gpu),
    }
}

fn show_info(model: &Path) -> Result<()> {
    let metadata = load_metadata(model)?;
    print_metadata_info(&metadata);

    let config = InferenceConfig::from_metadata(&metadata);
    config.print_info();
    match config.validate() {
        Ok(()) => println!("✓ 特徴量の順序はフォームと一致しています"),
        Err(e) => println!("✗ {}", e),
    }
    Ok(())
}

fn predict(model: &Path, csv: Option<PathBuf>, gpu: bool) -> Result<()> {
    let device_type = if gpu { DeviceType::Wgpu } else { DeviceType::Cpu };
    let classifier = load_classifier(model, device_type)?;
    let controller = PredictionController::new(classifier);

    let forms = match csv {
        Some(path) => load_forms(&path)?,
        None => vec![PredictionForm::from_values([
            "63", "Male", "3", "145", "233", "1", "0", "150", "No", "2.3", "0", "0", "1",
        ])],
    };
    info!("[predict] {}件を判定します", forms.len());

    for (row, form) in forms.iter().enumerate() {
        match controller.submit(form) {
            SubmitOutcome::Warning(warning) => println!("{:>4}: {}", row + 1, warning.message),
            SubmitOutcome::Dialog(dialog) => println!("{:>4}: {}", row + 1, dialog.message),
        }
    }
    Ok(())
}

fn pack_linear(coefficients: &Path, output: &Path, description: String) -> Result<()> {
    let bytes = std::fs::read(coefficients)
        .context(format!("Failed to read coefficients: {:?}", coefficients))?;
    let model = LinearClassifier::from_json_bytes(&bytes)?;
    let payload = serde_json::to_vec_pretty(&model.to_model_file())?;

    let metadata = ModelMetadata::new(ModelKind::Linear, None, description);
    let saved = save_model_with_metadata(output, &metadata, &payload)?;
    println!("✓ モデルパッケージを保存しました: {}", saved.display());
    Ok(())
}

fn init_config(output: Option<PathBuf>, model: Option<String>, gpu: bool) -> Result<()> {
    let mut config = AppConfig::default();
    if let Some(model_path) = model {
        config.model.model_path = model_path;
    }
    if gpu {
        config.device_type = DeviceType::Wgpu;
    }

    let path = output.unwrap_or_else(AppConfig::default_path);
    config
        .save(&path)
        .context(format!("Failed to write config: {:?}", path))?;
    config.log_summary();
    println!("✓ 設定ファイルを保存しました: {}", path.display());
    Ok(())
}
