//! モデルとメタデータの永続化
//!
//! Tar.gz形式でモデルとメタデータを1ファイルに統合して保存・読み込みします。
//!
//! ファイル構成（tar.gz内部）:
//! - metadata.json         - メタデータ（モデル種別、特徴量の順序など）
//! - model.json / model.bin - モデルの重み

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tar::{Archive, Builder};

use crate::model::model_metadata::ModelMetadata;

const METADATA_FILE_NAME: &str = "metadata.json";

/// メタデータと共にモデルをTar.gz形式で保存
///
/// 保存先のパスを返す（拡張子が.gzでなければ.tar.gzを付与する）
pub fn save_model_with_metadata(
    output_path: &Path,
    metadata: &ModelMetadata,
    payload: &[u8],
) -> Result<PathBuf> {
    let tar_gz_path = if output_path.extension().and_then(|s| s.to_str()) == Some("gz") {
        output_path.to_path_buf()
    } else {
        output_path.with_extension("tar.gz")
    };

    if let Some(parent) = tar_gz_path.parent() {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create parent directory: {:?}", parent))?;
    }

    let tar_gz_file = File::create(&tar_gz_path)
        .context(format!("Failed to create tar.gz file: {:?}", tar_gz_path))?;

    let encoder = GzEncoder::new(tar_gz_file, Compression::default());
    let mut tar_builder = Builder::new(encoder);

    let json_str = metadata.to_json_string()?;
    append_entry(&mut tar_builder, METADATA_FILE_NAME, json_str.as_bytes())?;
    append_entry(&mut tar_builder, metadata.model_kind.payload_file_name(), payload)?;

    tar_builder
        .into_inner()
        .context("Failed to finalize tar.gz archive")?
        .finish()
        .context("Failed to finish gzip stream")?;

    Ok(tar_gz_path)
}

fn append_entry<W: std::io::Write>(builder: &mut Builder<W>, name: &str, bytes: &[u8]) -> Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_path(name)?;
    header.set_size(bytes.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append(&header, bytes)
        .context(format!("Failed to add {} to tar", name))
}

fn open_archive(tar_gz_path: &Path) -> Result<Archive<GzDecoder<File>>> {
    let tar_gz_file = File::open(tar_gz_path)
        .context(format!("Failed to open tar.gz file: {:?}", tar_gz_path))?;
    Ok(Archive::new(GzDecoder::new(tar_gz_file)))
}

/// Tar.gzからモデルメタデータを読み込む
pub fn load_metadata(tar_gz_path: &Path) -> Result<ModelMetadata> {
    let mut archive = open_archive(tar_gz_path)?;

    for entry in archive.entries()? {
        let mut entry = entry?;
        if entry.path()?.to_str() == Some(METADATA_FILE_NAME) {
            let mut json_str = String::new();
            entry.read_to_string(&mut json_str)?;
            return ModelMetadata::from_json_string(&json_str);
        }
    }

    Err(anyhow::anyhow!("metadata.json not found in tar.gz archive"))
}

/// メタデータと重みを共に読み込む
///
/// 重みファイル名はメタデータのモデル種別で決まるため、
/// 両方をいったんメモリに読み込んでから対応付ける。
pub fn load_model_with_metadata(tar_gz_path: &Path) -> Result<(ModelMetadata, Vec<u8>)> {
    let mut archive = open_archive(tar_gz_path)?;

    let mut metadata_opt: Option<ModelMetadata> = None;
    let mut payloads: Vec<(String, Vec<u8>)> = Vec::new();

    for entry in archive.entries()? {
        let mut entry = entry?;
        let name = entry.path()?.to_string_lossy().to_string();

        if name == METADATA_FILE_NAME {
            let mut json_str = String::new();
            entry.read_to_string(&mut json_str)?;
            metadata_opt = Some(ModelMetadata::from_json_string(&json_str)?);
        } else {
            let mut buffer = Vec::new();
            entry.read_to_end(&mut buffer)?;
            payloads.push((name, buffer));
        }
    }

    let metadata =
        metadata_opt.ok_or_else(|| anyhow::anyhow!("metadata.json not found in tar.gz archive"))?;
    let payload_name = metadata.model_kind.payload_file_name();
    let payload = payloads
        .into_iter()
        .find(|(name, _)| name == payload_name)
        .map(|(_, bytes)| bytes)
        .ok_or_else(|| anyhow::anyhow!("{} not found in tar.gz archive", payload_name))?;

    Ok((metadata, payload))
}

/// メタデータをコンソールに表示
pub fn print_metadata_info(metadata: &ModelMetadata) {
    println!("\n=== モデルメタデータ ===");
    println!("モデル種別: {}", metadata.model_kind);
    println!("特徴量 ({}): {}", metadata.feature_names.len(), metadata.feature_names.join(", "));
    println!("クラスラベル: {}", metadata.class_labels.join(", "));
    if let Some(hidden_size) = metadata.hidden_size {
        println!("隠れ層サイズ: {}", hidden_size);
    }
    if !metadata.description.is_empty() {
        println!("説明: {}", metadata.description);
    }
    println!("作成日時: {}", metadata.exported_at);
    println!("========================");
}
