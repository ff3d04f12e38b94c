use serde::Serialize;
use tracing::{info, warn};

use crate::error::{FormError, PredictionError, MISSING_FIELDS_WARNING};
use crate::form::{self, FormLayout};
use crate::ml::BoxedClassifier;
use crate::types::{Label, PredictionForm};

pub const RESULT_TITLE: &str = "Prediction Result";
pub const CLOSE_LABEL: &str = "Close";
pub const DISEASE_MESSAGE: &str = "❤️‍🔥 Warning: Heart Disease Detected!";
pub const NO_DISEASE_MESSAGE: &str = "💚 No Heart Disease Detected.";

/// 表示色（フロントエンドではCSSクラス名として使う）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultColor {
    Orange,
    Red,
    Green,
}

/// フォーム上にそのまま表示する警告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineWarning {
    pub message: String,
    pub color: ResultColor,
}

/// 結果ダイアログの内容
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultDialog {
    pub title: String,
    pub message: String,
    pub color: ResultColor,
    pub dismiss_label: String,
}

/// 送信1回分の結果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// 未入力あり（ダイアログは開かない）
    Warning(InlineWarning),
    /// 予測結果またはエラー
    Dialog(ResultDialog),
}

/// 予測結果またはエラーをダイアログの内容に変換
pub fn present(result: &Result<Label, PredictionError>) -> ResultDialog {
    let (message, color) = match result {
        Ok(Label::Disease) => (DISEASE_MESSAGE.to_string(), ResultColor::Red),
        Ok(Label::NoDisease) => (NO_DISEASE_MESSAGE.to_string(), ResultColor::Green),
        Err(e) => (format!("Error: {}", e), ResultColor::Red),
    };

    ResultDialog {
        title: RESULT_TITLE.to_string(),
        message,
        color,
        dismiss_label: CLOSE_LABEL.to_string(),
    }
}

/// 予測フォームのコントローラ
///
/// 分類器は起動時に一度だけ読み込み、以降は参照のみ。
/// 読み込みに失敗した場合もウィンドウは開き、送信のたびにエラーを表示する。
pub struct PredictionController {
    classifier: Result<BoxedClassifier, String>,
}

impl PredictionController {
    pub fn new(classifier: BoxedClassifier) -> Self {
        Self {
            classifier: Ok(classifier),
        }
    }

    /// モデルなしで起動する（理由は送信時のエラーメッセージに使う）
    pub fn without_model(reason: impl Into<String>) -> Self {
        Self {
            classifier: Err(reason.into()),
        }
    }

    pub fn layout(&self) -> FormLayout {
        form::render()
    }

    pub fn is_model_loaded(&self) -> bool {
        self.classifier.is_ok()
    }

    /// 読み込み済みモデルの名前、または読み込み失敗の理由
    pub fn model_detail(&self) -> String {
        match &self.classifier {
            Ok(classifier) => classifier.name().to_string(),
            Err(reason) => reason.clone(),
        }
    }

    /// 送信ボタン押下時の処理
    ///
    /// 検証 → 型変換 → 推論 → 表示内容の作成 を1回で行う。
    pub fn submit(&self, form: &PredictionForm) -> SubmitOutcome {
        if let Err(FormError::MissingFields { fields }) = form::validate(form) {
            info!("[submit] 未入力の項目があります: {}件", fields.len());
            return SubmitOutcome::Warning(InlineWarning {
                message: MISSING_FIELDS_WARNING.to_string(),
                color: ResultColor::Orange,
            });
        }

        let result = self.predict(form);
        match &result {
            Ok(label) => info!("[submit] 予測完了: {:?}", label),
            Err(e) => warn!("[submit] 予測エラー: {}", e.log_summary()),
        }

        SubmitOutcome::Dialog(present(&result))
    }

    fn predict(&self, form: &PredictionForm) -> Result<Label, PredictionError> {
        let record = form::coerce(form)?;
        let features = record.to_feature_vector();

        let classifier = self
            .classifier
            .as_ref()
            .map_err(|reason| PredictionError::ModelUnavailable(reason.clone()))?;
        classifier.predict(&features)
    }
}
