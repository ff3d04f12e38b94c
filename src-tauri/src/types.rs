use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// 特徴量の数（モデル学習時の列数と一致する必要がある）
pub const FEATURE_COUNT: usize = 13;

/// 入力フォームの項目
///
/// 並び順はモデル学習時の特徴量の順序そのもの。
/// `Field::ALL` の順番を変えるとモデルへの入力がずれるので注意。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "age")]
    Age,
    #[serde(rename = "sex")]
    Sex,
    #[serde(rename = "chest_pain")]
    ChestPainType,
    #[serde(rename = "blood_pressure")]
    RestingBloodPressure,
    #[serde(rename = "cholesterol")]
    Cholesterol,
    #[serde(rename = "fasting_bs")]
    FastingBloodSugar,
    #[serde(rename = "rest_ecg")]
    RestingEcg,
    #[serde(rename = "max_hr")]
    MaxHeartRate,
    #[serde(rename = "exercise_angina")]
    ExerciseAngina,
    #[serde(rename = "oldpeak")]
    Oldpeak,
    #[serde(rename = "slope")]
    Slope,
    #[serde(rename = "ca")]
    MajorVessels,
    #[serde(rename = "thal")]
    Thal,
}

/// 入力欄の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// 整数のテキスト入力
    Integer,
    /// 浮動小数点数のテキスト入力
    Float,
    /// 2択のドロップダウン（先頭が 1、2番目が 0 にエンコードされる）
    Choice(&'static [&'static str; 2]),
}

impl Field {
    pub const ALL: [Field; FEATURE_COUNT] = [
        Field::Age,
        Field::Sex,
        Field::ChestPainType,
        Field::RestingBloodPressure,
        Field::Cholesterol,
        Field::FastingBloodSugar,
        Field::RestingEcg,
        Field::MaxHeartRate,
        Field::ExerciseAngina,
        Field::Oldpeak,
        Field::Slope,
        Field::MajorVessels,
        Field::Thal,
    ];

    /// フォームやCSVで使うキー名
    pub fn key(self) -> &'static str {
        match self {
            Field::Age => "age",
            Field::Sex => "sex",
            Field::ChestPainType => "chest_pain",
            Field::RestingBloodPressure => "blood_pressure",
            Field::Cholesterol => "cholesterol",
            Field::FastingBloodSugar => "fasting_bs",
            Field::RestingEcg => "rest_ecg",
            Field::MaxHeartRate => "max_hr",
            Field::ExerciseAngina => "exercise_angina",
            Field::Oldpeak => "oldpeak",
            Field::Slope => "slope",
            Field::MajorVessels => "ca",
            Field::Thal => "thal",
        }
    }

    /// 画面に表示するラベル
    pub fn label(self) -> &'static str {
        match self {
            Field::Age => "Age",
            Field::Sex => "Sex",
            Field::ChestPainType => "Chest Pain Type",
            Field::RestingBloodPressure => "Resting Blood Pressure",
            Field::Cholesterol => "Cholesterol",
            Field::FastingBloodSugar => "Fasting Blood Sugar > 120 mg/dl (1 = true; 0 = false)",
            Field::RestingEcg => "Resting ECG (0,1,2)",
            Field::MaxHeartRate => "Max Heart Rate Achieved",
            Field::ExerciseAngina => "Exercise Induced Angina",
            Field::Oldpeak => "Oldpeak",
            Field::Slope => "Slope (0,1,2)",
            Field::MajorVessels => "Number of major vessels (0-3)",
            Field::Thal => "Thal (1 = normal; 2 = fixed defect; 3 = reversible defect)",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Sex => FieldKind::Choice(&Sex::OPTIONS),
            Field::ExerciseAngina => FieldKind::Choice(&ExerciseAngina::OPTIONS),
            Field::Oldpeak => FieldKind::Float,
            _ => FieldKind::Integer,
        }
    }

    /// 特徴ベクトル内の位置（0始まり）
    pub fn position(self) -> usize {
        self as usize
    }

    /// キー名から項目を取得
    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.key() == key)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub const OPTIONS: [&'static str; 2] = ["Male", "Female"];

    pub fn from_option(value: &str) -> Option<Self> {
        match value {
            "Male" => Some(Sex::Male),
            "Female" => Some(Sex::Female),
            _ => None,
        }
    }

    /// 1 = Male, 0 = Female
    pub fn code(self) -> f64 {
        match self {
            Sex::Male => 1.0,
            Sex::Female => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExerciseAngina {
    Yes,
    No,
}

impl ExerciseAngina {
    pub const OPTIONS: [&'static str; 2] = ["Yes", "No"];

    pub fn from_option(value: &str) -> Option<Self> {
        match value {
            "Yes" => Some(ExerciseAngina::Yes),
            "No" => Some(ExerciseAngina::No),
            _ => None,
        }
    }

    /// 1 = Yes, 0 = No
    pub fn code(self) -> f64 {
        match self {
            ExerciseAngina::Yes => 1.0,
            ExerciseAngina::No => 0.0,
        }
    }
}

/// フォームから送られてくる生の入力値
///
/// 未入力の項目は `None` または空文字列になる。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionForm {
    pub age: Option<String>,
    pub sex: Option<String>,
    pub chest_pain: Option<String>,
    pub blood_pressure: Option<String>,
    pub cholesterol: Option<String>,
    pub fasting_bs: Option<String>,
    pub rest_ecg: Option<String>,
    pub max_hr: Option<String>,
    pub exercise_angina: Option<String>,
    pub oldpeak: Option<String>,
    pub slope: Option<String>,
    pub ca: Option<String>,
    pub thal: Option<String>,
}

impl PredictionForm {
    pub fn value(&self, field: Field) -> Option<&str> {
        let slot = match field {
            Field::Age => &self.age,
            Field::Sex => &self.sex,
            Field::ChestPainType => &self.chest_pain,
            Field::RestingBloodPressure => &self.blood_pressure,
            Field::Cholesterol => &self.cholesterol,
            Field::FastingBloodSugar => &self.fasting_bs,
            Field::RestingEcg => &self.rest_ecg,
            Field::MaxHeartRate => &self.max_hr,
            Field::ExerciseAngina => &self.exercise_angina,
            Field::Oldpeak => &self.oldpeak,
            Field::Slope => &self.slope,
            Field::MajorVessels => &self.ca,
            Field::Thal => &self.thal,
        };
        slot.as_deref()
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = Some(value.into());
        match field {
            Field::Age => self.age = value,
            Field::Sex => self.sex = value,
            Field::ChestPainType => self.chest_pain = value,
            Field::RestingBloodPressure => self.blood_pressure = value,
            Field::Cholesterol => self.cholesterol = value,
            Field::FastingBloodSugar => self.fasting_bs = value,
            Field::RestingEcg => self.rest_ecg = value,
            Field::MaxHeartRate => self.max_hr = value,
            Field::ExerciseAngina => self.exercise_angina = value,
            Field::Oldpeak => self.oldpeak = value,
            Field::Slope => self.slope = value,
            Field::MajorVessels => self.ca = value,
            Field::Thal => self.thal = value,
        }
    }

    /// `Field::ALL` の順に値を並べてフォームを作る
    pub fn from_values(values: [&str; FEATURE_COUNT]) -> Self {
        let mut form = Self::default();
        for (field, value) in Field::ALL.iter().zip(values) {
            form.set(*field, value);
        }
        form
    }
}

/// 型変換済みの患者データ
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRecord {
    pub age: i64,
    pub sex: Sex,
    pub chest_pain_type: i64,
    pub resting_blood_pressure: i64,
    pub cholesterol: i64,
    pub fasting_blood_sugar: i64,
    pub resting_ecg: i64,
    pub max_heart_rate: i64,
    pub exercise_angina: ExerciseAngina,
    pub oldpeak: f64,
    pub slope: i64,
    pub major_vessels: i64,
    pub thal: i64,
}

impl PatientRecord {
    /// モデル入力用の特徴ベクトルに変換
    pub fn to_feature_vector(&self) -> FeatureVector {
        FeatureVector([
            self.age as f64,
            self.sex.code(),
            self.chest_pain_type as f64,
            self.resting_blood_pressure as f64,
            self.cholesterol as f64,
            self.fasting_blood_sugar as f64,
            self.resting_ecg as f64,
            self.max_heart_rate as f64,
            self.exercise_angina.code(),
            self.oldpeak,
            self.slope as f64,
            self.major_vessels as f64,
            self.thal as f64,
        ])
    }
}

/// 1回の送信ごとに作られる13要素の特徴ベクトル
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, field: Field) -> f64 {
        self.0[field.position()]
    }

    /// 形状 [1, 13] の入力行列
    pub fn to_input_matrix(&self) -> Array2<f64> {
        Array2::from_shape_fn((1, FEATURE_COUNT), |(_, col)| self.0[col])
    }
}

/// 分類器の出力ラベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    NoDisease,
    Disease,
}

impl Label {
    /// クラス番号からラベルに変換（0/1 以外は `None`）
    pub fn from_class_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Label::NoDisease),
            1 => Some(Label::Disease),
            _ => None,
        }
    }
}
