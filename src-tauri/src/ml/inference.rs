//! モデル推論機能
//!
//! モデルパッケージを読み込み、種別に応じた分類器を作成します。

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::ml::classifier::{Classifier, LinearClassifier};
use crate::model::{load_model_with_metadata, DeviceType, InferenceConfig, ModelKind};

#[cfg(feature = "ml")]
use burn::{
    module::Module,
    record::{BinBytesRecorder, FullPrecisionSettings, Recorder},
    tensor::{backend::Backend, ElementConversion, Tensor, TensorData},
};

#[cfg(feature = "ml")]
use crate::error::PredictionError;
#[cfg(feature = "ml")]
use crate::ml::ml_model::{HeartDiseaseMlp, ModelConfig};
#[cfg(feature = "ml")]
use crate::types::{FeatureVector, Label, FEATURE_COUNT};

/// 推論に使う分類器（Tauriの状態として保持するためSendが必要）
pub type BoxedClassifier = Box<dyn Classifier + Send>;

/// モデルパッケージを読み込んで分類器を作成
///
/// 特徴量の順序・数が合わないパッケージはここで拒否する。
pub fn load_classifier(model_path: &Path, device_type: DeviceType) -> Result<BoxedClassifier> {
    let (metadata, payload) = load_model_with_metadata(model_path)
        .context(format!("Failed to load model package: {}", model_path.display()))?;
    let config = InferenceConfig::from_metadata(&metadata);
    config.validate().context("Model package does not match the form")?;

    info!(
        "[load_classifier] {} モデルを読み込みました: {}",
        config.model_kind,
        model_path.display()
    );

    match config.model_kind {
        ModelKind::Linear => Ok(Box::new(LinearClassifier::from_json_bytes(&payload)?)),
        ModelKind::Mlp => load_mlp(&config, payload, device_type),
    }
}

#[cfg(feature = "ml")]
fn load_mlp(config: &InferenceConfig, payload: Vec<u8>, device_type: DeviceType) -> Result<BoxedClassifier> {
    use burn::backend::{NdArray, Wgpu};

    info!("[load_classifier] 計算デバイス: {}", device_type);
    match device_type {
        DeviceType::Cpu => Ok(Box::new(InferenceEngine::<NdArray>::load(
            config,
            payload,
            Default::default(),
        )?)),
        DeviceType::Wgpu => Ok(Box::new(InferenceEngine::<Wgpu>::load(
            config,
            payload,
            Default::default(),
        )?)),
    }
}

#[cfg(not(feature = "ml"))]
fn load_mlp(_config: &InferenceConfig, _payload: Vec<u8>, _device_type: DeviceType) -> Result<BoxedClassifier> {
    anyhow::bail!("MLP models require the `ml` feature (machine learning support is disabled)")
}

/// Burnモデルの推論エンジン
#[cfg(feature = "ml")]
pub struct InferenceEngine<B: Backend> {
    model: HeartDiseaseMlp<B>,
    device: B::Device,
}

#[cfg(feature = "ml")]
impl<B: Backend> InferenceEngine<B> {
    /// 記録済みの重みからエンジンを初期化
    pub fn load(config: &InferenceConfig, model_binary: Vec<u8>, device: B::Device) -> Result<Self> {
        let model_config = ModelConfig::new(FEATURE_COUNT, config.num_classes())
            .with_hidden_size(config.hidden_size);
        let model = model_config.init::<B>(&device);

        let recorder = BinBytesRecorder::<FullPrecisionSettings>::default();
        let record = Recorder::<B>::load(&recorder, model_binary, &device)
            .map_err(|e| anyhow::anyhow!("Failed to load model weights: {:?}", e))?;

        Ok(Self {
            model: model.load_record(record),
            device,
        })
    }

    /// 形状 [1, 13] の入力でクラス番号を求める
    pub fn classify(&self, features: &FeatureVector) -> i64 {
        let values: Vec<f32> = features.as_slice().iter().map(|v| *v as f32).collect();
        let input = Tensor::<B, 2>::from_data(TensorData::new(values, [1, FEATURE_COUNT]), &self.device);

        let (predictions, _logits) = self.model.predict(input);
        predictions.into_scalar().elem::<i64>()
    }
}

#[cfg(feature = "ml")]
impl<B: Backend> Classifier for InferenceEngine<B> {
    fn predict(&self, features: &FeatureVector) -> Result<Label, PredictionError> {
        let class_index = self.classify(features);
        Label::from_class_index(class_index).ok_or(PredictionError::UnexpectedLabel(class_index))
    }

    fn name(&self) -> &str {
        "mlp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::classifier::LinearModelFile;
    use crate::model::{save_model_with_metadata, ModelMetadata};
    use crate::types::{FeatureVector, Field, Label, FEATURE_COUNT};

    fn reference_features() -> FeatureVector {
        FeatureVector([63.0, 1.0, 3.0, 145.0, 233.0, 1.0, 0.0, 150.0, 0.0, 2.3, 0.0, 0.0, 1.0])
    }

    fn write_linear_package(dir: &Path, metadata: &ModelMetadata, coefficients: Vec<f64>) -> std::path::PathBuf {
        let payload = serde_json::to_vec(&LinearModelFile {
            coefficients,
            intercept: -1.0,
        })
        .unwrap();
        save_model_with_metadata(&dir.join("linear.tar.gz"), metadata, &payload).unwrap()
    }

    #[test]
    fn test_load_linear_package() {
        let dir = tempfile::tempdir().unwrap();
        let mut coefficients = vec![0.0; FEATURE_COUNT];
        coefficients[Field::Oldpeak.position()] = 1.0;
        let metadata = ModelMetadata::new(ModelKind::Linear, None, "oldpeak only");
        let path = write_linear_package(dir.path(), &metadata, coefficients);

        let classifier = load_classifier(&path, DeviceType::Cpu).unwrap();
        assert_eq!(classifier.name(), "linear");
        // 2.3 - 1.0 > 0
        assert_eq!(classifier.predict(&reference_features()).unwrap(), Label::Disease);
    }

    #[test]
    fn test_rejects_reordered_features() {
        let dir = tempfile::tempdir().unwrap();
        let mut metadata = ModelMetadata::new(ModelKind::Linear, None, "");
        metadata.feature_names.swap(3, 4);
        let path = write_linear_package(dir.path(), &metadata, vec![0.0; FEATURE_COUNT]);

        let err = load_classifier(&path, DeviceType::Cpu).err().unwrap();
        assert!(format!("{:#}", err).contains("feature order mismatch"));
    }

    #[test]
    fn test_rejects_wrong_coefficient_count() {
        let dir = tempfile::tempdir().unwrap();
        let metadata = ModelMetadata::new(ModelKind::Linear, None, "");
        let path = write_linear_package(dir.path(), &metadata, vec![0.0; 10]);
        assert!(load_classifier(&path, DeviceType::Cpu).is_err());
    }

    #[cfg(feature = "ml")]
    #[test]
    fn test_load_mlp_package() {
        use burn::backend::NdArray;
        use crate::ml::ml_model::NUM_CLASSES;

        let dir = tempfile::tempdir().unwrap();
        let device = Default::default();
        let model = ModelConfig::new(FEATURE_COUNT, NUM_CLASSES)
            .with_hidden_size(8)
            .init::<NdArray>(&device);
        let bytes = BinBytesRecorder::<FullPrecisionSettings>::default()
            .record(model.into_record(), ())
            .unwrap();

        let metadata = ModelMetadata::new(ModelKind::Mlp, Some(8), "random weights");
        let path = save_model_with_metadata(&dir.path().join("mlp.tar.gz"), &metadata, &bytes).unwrap();

        let classifier = load_classifier(&path, DeviceType::Cpu).unwrap();
        assert_eq!(classifier.name(), "mlp");
        let label = classifier.predict(&reference_features()).unwrap();
        assert!(matches!(label, Label::NoDisease | Label::Disease));
    }
}
