//! フォーム処理と予測処理のエラー型

use thiserror::Error;

use crate::types::Field;

/// 未入力時にフォーム上に表示する固定の警告文
pub const MISSING_FIELDS_WARNING: &str = "⚠️ Please fill all fields!";

/// フォームの検証・型変換で発生するエラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    /// 未入力の項目がある
    #[error("{}", MISSING_FIELDS_WARNING)]
    MissingFields { fields: Vec<Field> },

    /// 数値として解釈できない
    #[error("invalid {expected} for {field}: {value:?} ({reason})")]
    InvalidNumber {
        field: Field,
        value: String,
        expected: &'static str,
        reason: String,
    },

    /// 選択肢にない値
    #[error("unknown option for {field}: {value:?} (expected one of {options:?})")]
    UnknownOption {
        field: Field,
        value: String,
        options: &'static [&'static str; 2],
    },
}

impl FormError {
    /// ログ用の要約（入力値は含めない）
    pub fn log_summary(&self) -> String {
        match self {
            FormError::MissingFields { fields } => format!("missing fields ({})", fields.len()),
            FormError::InvalidNumber { field, expected, .. } => {
                format!("invalid {} for {}", expected, field.key())
            }
            FormError::UnknownOption { field, .. } => format!("unknown option for {}", field.key()),
        }
    }
}

/// 型変換または分類器の呼び出しで発生するエラー
///
/// どれが起きても結果ダイアログにメッセージがそのまま表示される。
#[derive(Error, Debug)]
pub enum PredictionError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error("model is not loaded: {0}")]
    ModelUnavailable(String),

    #[error("input shape mismatch: model expects {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("classifier returned unexpected label {0}")]
    UnexpectedLabel(i64),

    #[error("inference failed: {0}")]
    Inference(String),
}

impl PredictionError {
    /// ログ用の要約
    ///
    /// 表示用メッセージは入力値を含むため、ログにはこちらを使う。
    pub fn log_summary(&self) -> String {
        match self {
            PredictionError::Form(e) => e.log_summary(),
            PredictionError::ModelUnavailable(_) => "model is not loaded".to_string(),
            PredictionError::Inference(_) => "inference failed".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_summary_omits_input_value() {
        let err = PredictionError::from(FormError::InvalidNumber {
            field: Field::Age,
            value: "63a".to_string(),
            expected: "integer",
            reason: "invalid digit found in string".to_string(),
        });
        assert!(err.to_string().contains("63a"));

        let summary = err.log_summary();
        assert_eq!(summary, "invalid integer for age");
        assert!(!summary.contains("63a"));
    }

    #[test]
    fn test_log_summary_omits_unknown_option() {
        let err = PredictionError::from(FormError::UnknownOption {
            field: Field::Sex,
            value: "Other".to_string(),
            options: &["Male", "Female"],
        });
        assert_eq!(err.log_summary(), "unknown option for sex");
    }

    #[test]
    fn test_log_summary_keeps_shape_details() {
        let err = PredictionError::ShapeMismatch { expected: 13, actual: 12 };
        assert_eq!(err.log_summary(), err.to_string());
    }
}
