//! モデルメタデータを使用した推論設定
//!
//! メタデータに記録された特徴量の順序がフォームの順序と一致するかを検証します。

use anyhow::{bail, Result};

use crate::model::model_metadata::{ModelKind, ModelMetadata};
use crate::types::{Field, FEATURE_COUNT};

/// 既定のMLP隠れ層サイズ
pub const DEFAULT_HIDDEN_SIZE: usize = 32;

/// モデルメタデータから推論用情報を取得
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub model_kind: ModelKind,

    /// 学習時の特徴量の並び
    pub feature_names: Vec<String>,

    /// クラス番号順のラベル名
    pub class_labels: Vec<String>,

    pub hidden_size: usize,
}

impl InferenceConfig {
    /// メタデータからInferenceConfigを作成
    pub fn from_metadata(metadata: &ModelMetadata) -> Self {
        Self {
            model_kind: metadata.model_kind,
            feature_names: metadata.feature_names.clone(),
            class_labels: metadata.class_labels.clone(),
            hidden_size: metadata.hidden_size.unwrap_or(DEFAULT_HIDDEN_SIZE),
        }
    }

    /// 特徴量の数と順序、クラス数を検証
    pub fn validate(&self) -> Result<()> {
        if self.feature_names.len() != FEATURE_COUNT {
            bail!(
                "model expects {} features, the form provides {}",
                self.feature_names.len(),
                FEATURE_COUNT
            );
        }

        for (position, (name, field)) in self.feature_names.iter().zip(Field::ALL).enumerate() {
            if name != field.key() {
                bail!(
                    "feature order mismatch at position {}: model has {:?}, form provides {:?}",
                    position + 1,
                    name,
                    field.key()
                );
            }
        }

        if self.num_classes() != 2 {
            bail!("model must be a binary classifier, found {} classes", self.num_classes());
        }

        Ok(())
    }

    pub fn num_classes(&self) -> usize {
        self.class_labels.len()
    }

    /// 設定情報を表示
    pub fn print_info(&self) {
        println!("\n=== 推論設定 ===");
        println!("モデル種別: {}", self.model_kind);
        println!("特徴量数: {}", self.feature_names.len());
        println!("クラス: {}", self.class_labels.join(", "));
        if self.model_kind == ModelKind::Mlp {
            println!("隠れ層サイズ: {}", self.hidden_size);
        }
        println!("==================");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_form_order() {
        let metadata = ModelMetadata::new(ModelKind::Mlp, Some(8), "");
        let config = InferenceConfig::from_metadata(&metadata);
        assert!(config.validate().is_ok());
        assert_eq!(config.hidden_size, 8);
    }

    #[test]
    fn test_validate_rejects_swapped_features() {
        let mut metadata = ModelMetadata::new(ModelKind::Linear, None, "");
        metadata.feature_names.swap(0, 1);
        let err = InferenceConfig::from_metadata(&metadata).validate().unwrap_err();
        assert!(err.to_string().contains("position 1"));
    }

    #[test]
    fn test_validate_rejects_wrong_feature_count() {
        let mut metadata = ModelMetadata::new(ModelKind::Linear, None, "");
        metadata.feature_names.pop();
        assert!(InferenceConfig::from_metadata(&metadata).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_multiclass() {
        let mut metadata = ModelMetadata::new(ModelKind::Linear, None, "");
        metadata.class_labels.push("unknown".to_string());
        assert!(InferenceConfig::from_metadata(&metadata).validate().is_err());
    }

    #[test]
    fn test_default_hidden_size() {
        let metadata = ModelMetadata::new(ModelKind::Mlp, None, "");
        assert_eq!(InferenceConfig::from_metadata(&metadata).hidden_size, DEFAULT_HIDDEN_SIZE);
    }
}
