//! 入力フォームの定義・検証・型変換

use serde::Serialize;

use crate::error::FormError;
use crate::types::{ExerciseAngina, Field, FieldKind, PatientRecord, PredictionForm, Sex};

pub const FORM_TITLE: &str = "💓 Heart Disease Predictor";
pub const SUBMIT_LABEL: &str = "Predict";

/// フロントエンドに渡す入力欄の定義
#[derive(Debug, Clone, Serialize)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    /// "text" または "choice"
    pub control: &'static str,
    pub options: Vec<&'static str>,
}

impl From<Field> for FieldDescriptor {
    fn from(field: Field) -> Self {
        let (control, options) = match field.kind() {
            FieldKind::Choice(options) => ("choice", options.to_vec()),
            FieldKind::Integer | FieldKind::Float => ("text", Vec::new()),
        };
        Self {
            key: field.key(),
            label: field.label(),
            control,
            options,
        }
    }
}

/// 画面レイアウト
#[derive(Debug, Clone, Serialize)]
pub struct FormLayout {
    pub title: &'static str,
    pub fields: Vec<FieldDescriptor>,
    pub submit_label: &'static str,
}

/// 固定のフォーム定義を作成
pub fn render() -> FormLayout {
    FormLayout {
        title: FORM_TITLE,
        fields: Field::ALL.iter().copied().map(FieldDescriptor::from).collect(),
        submit_label: SUBMIT_LABEL,
    }
}

/// 未入力の項目を列挙
pub fn missing_fields(form: &PredictionForm) -> Vec<Field> {
    Field::ALL
        .iter()
        .copied()
        .filter(|field| form.value(*field).map_or(true, str::is_empty))
        .collect()
}

/// 全項目が入力済みかを検証
///
/// 空白のみの値は「入力あり」とみなし、型変換の段階でエラーにする。
pub fn validate(form: &PredictionForm) -> Result<(), FormError> {
    let fields = missing_fields(form);
    if fields.is_empty() {
        Ok(())
    } else {
        Err(FormError::MissingFields { fields })
    }
}

/// 各項目を数値型に変換
pub fn coerce(form: &PredictionForm) -> Result<PatientRecord, FormError> {
    Ok(PatientRecord {
        age: parse_integer(form, Field::Age)?,
        sex: parse_sex(form)?,
        chest_pain_type: parse_integer(form, Field::ChestPainType)?,
        resting_blood_pressure: parse_integer(form, Field::RestingBloodPressure)?,
        cholesterol: parse_integer(form, Field::Cholesterol)?,
        fasting_blood_sugar: parse_integer(form, Field::FastingBloodSugar)?,
        resting_ecg: parse_integer(form, Field::RestingEcg)?,
        max_heart_rate: parse_integer(form, Field::MaxHeartRate)?,
        exercise_angina: parse_angina(form)?,
        oldpeak: parse_float(form, Field::Oldpeak)?,
        slope: parse_integer(form, Field::Slope)?,
        major_vessels: parse_integer(form, Field::MajorVessels)?,
        thal: parse_integer(form, Field::Thal)?,
    })
}

fn raw(form: &PredictionForm, field: Field) -> Result<&str, FormError> {
    form.value(field)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| FormError::MissingFields { fields: vec![field] })
}

fn parse_integer(form: &PredictionForm, field: Field) -> Result<i64, FormError> {
    let value = raw(form, field)?;
    value.trim().parse::<i64>().map_err(|e| FormError::InvalidNumber {
        field,
        value: value.to_string(),
        expected: "integer",
        reason: e.to_string(),
    })
}

fn parse_float(form: &PredictionForm, field: Field) -> Result<f64, FormError> {
    let value = raw(form, field)?;
    let parsed = value.trim().parse::<f64>().map_err(|e| FormError::InvalidNumber {
        field,
        value: value.to_string(),
        expected: "number",
        reason: e.to_string(),
    })?;
    if !parsed.is_finite() {
        return Err(FormError::InvalidNumber {
            field,
            value: value.to_string(),
            expected: "number",
            reason: "value must be finite".to_string(),
        });
    }
    Ok(parsed)
}

fn parse_sex(form: &PredictionForm) -> Result<Sex, FormError> {
    let value = raw(form, Field::Sex)?;
    Sex::from_option(value).ok_or_else(|| FormError::UnknownOption {
        field: Field::Sex,
        value: value.to_string(),
        options: &Sex::OPTIONS,
    })
}

fn parse_angina(form: &PredictionForm) -> Result<ExerciseAngina, FormError> {
    let value = raw(form, Field::ExerciseAngina)?;
    ExerciseAngina::from_option(value).ok_or_else(|| FormError::UnknownOption {
        field: Field::ExerciseAngina,
        value: value.to_string(),
        options: &ExerciseAngina::OPTIONS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FEATURE_COUNT;

    fn reference_form() -> PredictionForm {
        PredictionForm::from_values([
            "63", "Male", "3", "145", "233", "1", "0", "150", "No", "2.3", "0", "0", "1",
        ])
    }

    #[test]
    fn test_render_lists_fields_in_order() {
        let layout = render();
        assert_eq!(layout.fields.len(), FEATURE_COUNT);
        assert_eq!(layout.fields[0].key, "age");
        assert_eq!(layout.fields[1].control, "choice");
        assert_eq!(layout.fields[1].options, vec!["Male", "Female"]);
        assert_eq!(layout.fields[8].options, vec!["Yes", "No"]);
        assert_eq!(layout.fields[12].key, "thal");
        assert_eq!(layout.submit_label, "Predict");
    }

    #[test]
    fn test_validate_accepts_complete_form() {
        assert!(validate(&reference_form()).is_ok());
    }

    #[test]
    fn test_validate_reports_empty_and_absent_fields() {
        let mut form = reference_form();
        form.set(Field::Cholesterol, "");
        form.thal = None;

        let err = validate(&form).unwrap_err();
        assert_eq!(
            err,
            FormError::MissingFields {
                fields: vec![Field::Cholesterol, Field::Thal]
            }
        );
        assert_eq!(err.to_string(), "⚠️ Please fill all fields!");
    }

    #[test]
    fn test_coerce_reference_patient() {
        let features = coerce(&reference_form()).unwrap().to_feature_vector();
        assert_eq!(
            features.0,
            [63.0, 1.0, 3.0, 145.0, 233.0, 1.0, 0.0, 150.0, 0.0, 2.3, 0.0, 0.0, 1.0]
        );
    }

    #[test]
    fn test_coerce_choice_encodings() {
        let mut form = reference_form();
        form.set(Field::Sex, "Female");
        form.set(Field::ExerciseAngina, "Yes");
        let features = coerce(&form).unwrap().to_feature_vector();
        assert_eq!(features.get(Field::Sex), 0.0);
        assert_eq!(features.get(Field::ExerciseAngina), 1.0);
    }

    #[test]
    fn test_coerce_trims_whitespace() {
        let mut form = reference_form();
        form.set(Field::Age, " 54 ");
        form.set(Field::Oldpeak, "1.0 ");
        let record = coerce(&form).unwrap();
        assert_eq!(record.age, 54);
        assert_eq!(record.oldpeak, 1.0);
    }

    #[test]
    fn test_coerce_rejects_non_numeric_integer() {
        let mut form = reference_form();
        form.set(Field::Age, "abc");
        let err = coerce(&form).unwrap_err();
        assert!(matches!(err, FormError::InvalidNumber { field: Field::Age, .. }));
        let message = err.to_string();
        assert!(message.contains("Age"));
        assert!(message.contains("\"abc\""));
        assert!(message.contains("invalid digit"));
    }

    #[test]
    fn test_coerce_rejects_decimal_in_integer_field() {
        let mut form = reference_form();
        form.set(Field::MaxHeartRate, "150.5");
        assert!(matches!(
            coerce(&form),
            Err(FormError::InvalidNumber { field: Field::MaxHeartRate, .. })
        ));
    }

    #[test]
    fn test_coerce_rejects_whitespace_only_value() {
        let mut form = reference_form();
        form.set(Field::Slope, "   ");
        assert!(validate(&form).is_ok());
        assert!(matches!(
            coerce(&form),
            Err(FormError::InvalidNumber { field: Field::Slope, .. })
        ));
    }

    #[test]
    fn test_coerce_rejects_non_finite_oldpeak() {
        let mut form = reference_form();
        form.set(Field::Oldpeak, "NaN");
        assert!(matches!(
            coerce(&form),
            Err(FormError::InvalidNumber { field: Field::Oldpeak, .. })
        ));
    }

    #[test]
    fn test_coerce_rejects_non_numeric_oldpeak() {
        let mut form = reference_form();
        form.set(Field::Oldpeak, "abc");
        let err = coerce(&form).unwrap_err();
        assert!(matches!(err, FormError::InvalidNumber { field: Field::Oldpeak, .. }));
        assert!(err.to_string().contains("\"abc\""));
    }

    #[test]
    fn test_coerce_rejects_unknown_option() {
        let mut form = reference_form();
        form.set(Field::Sex, "Other");
        let err = coerce(&form).unwrap_err();
        assert!(matches!(err, FormError::UnknownOption { field: Field::Sex, .. }));
    }
}
