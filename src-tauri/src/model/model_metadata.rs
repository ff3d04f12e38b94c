//! モデルメタデータの定義
//!
//! tar.gz形式のモデルパッケージに同梱されるmetadata.jsonの内容です。
//!
//! ## 特徴量の順序
//! - `feature_names` は学習時の列順をそのまま記録する
//! - 読み込み時に `Field::ALL` のキー順と一致しない場合は拒否される

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::types::Field;

/// モデルの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// 係数と切片のみの線形モデル（model.json）
    Linear,
    /// Burnで記録した多層パーセプトロン（model.bin）
    Mlp,
}

impl ModelKind {
    /// パッケージ内の重みファイル名
    pub fn payload_file_name(self) -> &'static str {
        match self {
            ModelKind::Linear => "model.json",
            ModelKind::Mlp => "model.bin",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelKind::Linear => write!(f, "Linear"),
            ModelKind::Mlp => write!(f, "MLP"),
        }
    }
}

/// モデルメタデータ
///
/// tar.gz形式で保存される情報：
/// - metadata.json: このメタデータ（JSON形式）
/// - model.json / model.bin: モデルの重み
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_kind: ModelKind,

    /// 学習時の特徴量の並び
    /// 例: ["age", "sex", "chest_pain", ..., "thal"]
    pub feature_names: Vec<String>,

    /// クラス番号順のラベル名
    /// 例: ["no_disease", "disease"]
    #[serde(default = "default_class_labels")]
    pub class_labels: Vec<String>,

    /// MLPの隠れ層サイズ（線形モデルでは不要）
    #[serde(default)]
    pub hidden_size: Option<usize>,

    #[serde(default)]
    pub description: String,

    /// パッケージ作成時刻（ISO8601形式）
    pub exported_at: String,
}

fn default_class_labels() -> Vec<String> {
    vec!["no_disease".to_string(), "disease".to_string()]
}

impl ModelMetadata {
    /// 現在のフォーム順の特徴量名でメタデータを作成
    pub fn new(model_kind: ModelKind, hidden_size: Option<usize>, description: impl Into<String>) -> Self {
        Self {
            model_kind,
            feature_names: Field::ALL.iter().map(|f| f.key().to_string()).collect(),
            class_labels: default_class_labels(),
            hidden_size,
            description: description.into(),
            exported_at: chrono::Local::now().to_rfc3339(),
        }
    }

    /// メタデータをJSON文字列に変換
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize metadata to JSON")
    }

    /// JSON文字列からメタデータを生成
    pub fn from_json_string(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to deserialize metadata from JSON")
    }
}
