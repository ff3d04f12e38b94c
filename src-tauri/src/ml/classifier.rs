//! 分類器の共通インターフェースと線形モデル
//!
//! 学習済みモデルはアプリの外で作られる前提で、ここでは推論のみを扱います。

use anyhow::{Context, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::PredictionError;
use crate::types::{FeatureVector, Label, FEATURE_COUNT};

/// 学習済み分類器
///
/// 13要素の特徴ベクトルを受け取り、0/1 のラベルを返す。
pub trait Classifier {
    fn predict(&self, features: &FeatureVector) -> Result<Label, PredictionError>;

    /// ログ表示用の名前
    fn name(&self) -> &str;
}

/// model.json の中身
///
/// ロジスティック回帰などの係数と切片をそのまま書き出したもの。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModelFile {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// 線形の決定関数 `w·x + b > 0 → 1` で分類するモデル
#[derive(Debug, Clone)]
pub struct LinearClassifier {
    coefficients: Array1<f64>,
    intercept: f64,
}

impl LinearClassifier {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self, PredictionError> {
        if coefficients.len() != FEATURE_COUNT {
            return Err(PredictionError::ShapeMismatch {
                expected: FEATURE_COUNT,
                actual: coefficients.len(),
            });
        }
        Ok(Self {
            coefficients: Array1::from(coefficients),
            intercept,
        })
    }

    /// model.json のバイト列から読み込む
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self> {
        let file: LinearModelFile =
            serde_json::from_slice(bytes).context("Failed to parse linear model JSON")?;
        Ok(Self::new(file.coefficients, file.intercept)?)
    }

    pub fn to_model_file(&self) -> LinearModelFile {
        LinearModelFile {
            coefficients: self.coefficients.to_vec(),
            intercept: self.intercept,
        }
    }

    /// 決定関数の値 [batch]
    pub fn decision_function(&self, inputs: &Array2<f64>) -> Result<Array1<f64>, PredictionError> {
        if inputs.ncols() != self.coefficients.len() {
            return Err(PredictionError::ShapeMismatch {
                expected: self.coefficients.len(),
                actual: inputs.ncols(),
            });
        }
        Ok(inputs.dot(&self.coefficients) + self.intercept)
    }

    /// 入力行列 [batch, 13] に対するクラス番号
    pub fn predict_classes(&self, inputs: &Array2<f64>) -> Result<Array1<i64>, PredictionError> {
        let scores = self.decision_function(inputs)?;
        Ok(scores.mapv(|score| if score > 0.0 { 1 } else { 0 }))
    }
}

impl Classifier for LinearClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<Label, PredictionError> {
        let classes = self.predict_classes(&features.to_input_matrix())?;
        let class_index = classes
            .first()
            .copied()
            .ok_or_else(|| PredictionError::Inference("empty prediction".to_string()))?;
        Label::from_class_index(class_index).ok_or(PredictionError::UnexpectedLabel(class_index))
    }

    fn name(&self) -> &str {
        "linear"
    }
}
