use crate::types::{Field, PredictionForm};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use std::path::Path;

/// 患者データのCSVを読み込む
///
/// ヘッダーはフォームのキー名（age, sex, chest_pain, ...）。
/// 列の並びは任意で、列が無い項目や空のセルは未入力として扱う。
pub fn load_forms(path: &Path) -> Result<Vec<PredictionForm>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_path(path)
        .context(format!("Failed to open CSV: {:?}", path))?;

    let headers = reader.headers()?.clone();
    let unknown: Vec<&str> = headers
        .iter()
        .filter(|h| Field::from_key(h).is_none())
        .collect();
    if !unknown.is_empty() {
        anyhow::bail!("Unknown CSV columns: {}", unknown.join(", "));
    }

    let mut forms = Vec::new();
    for (row, result) in reader.deserialize::<PredictionForm>().enumerate() {
        let form = result.context(format!("Invalid CSV row {}", row + 1))?;
        forms.push(form);
    }

    Ok(forms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form;

    #[test]
    fn test_load_forms() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patients.csv");
        std::fs::write(
            &path,
            "age,sex,chest_pain,blood_pressure,cholesterol,fasting_bs,rest_ecg,max_hr,exercise_angina,oldpeak,slope,ca,thal\n\
             63,Male,3,145,233,1,0,150,No,2.3,0,0,1\n\
             41,Female,1,130,204,0,0,172,No,,2,0,2\n",
        )
        .unwrap();

        let forms = load_forms(&path).unwrap();
        assert_eq!(forms.len(), 2);
        assert!(form::validate(&forms[0]).is_ok());
        assert_eq!(forms[0].value(Field::Oldpeak), Some("2.3"));
        assert_eq!(form::missing_fields(&forms[1]), vec![Field::Oldpeak]);
    }

    #[test]
    fn test_missing_columns_are_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.csv");
        std::fs::write(&path, "sex,age\nMale,50\n").unwrap();

        let forms = load_forms(&path).unwrap();
        assert_eq!(forms[0].value(Field::Age), Some("50"));
        assert_eq!(form::missing_fields(&forms[0]).len(), 11);
    }

    #[test]
    fn test_unknown_column_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "age,weight\n50,80\n").unwrap();

        let err = load_forms(&path).unwrap_err();
        assert!(err.to_string().contains("weight"));
    }
}
