//! アプリケーション設定管理モジュール
//!
//! 計算デバイスやモデルファイルのパスをJSON形式で保存・読み込みします。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 計算デバイスの種類（MLPモデルのみ影響する）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub enum DeviceType {
    /// WGPU (GPU) バックエンド
    Wgpu,
    /// NdArray (CPU) バックエンド
    #[default]
    Cpu,
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceType::Wgpu => write!(f, "WGPU (GPU)"),
            DeviceType::Cpu => write!(f, "CPU (NdArray)"),
        }
    }
}

/// モデル設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// 使用するモデルパッケージ（tar.gz）のパス
    pub model_path: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model_path: "models/heart_disease_model.tar.gz".to_string(),
        }
    }
}

impl ModelSettings {
    /// モデルパスを絶対パスに解決
    ///
    /// 相対パスはプロジェクトルート（src-tauriから起動された場合はその親）を基準にする。
    pub fn resolve_path(&self, current_dir: &Path) -> PathBuf {
        let normalized = self.model_path.replace('\\', "/");
        let path = Path::new(&normalized);
        if path.is_absolute() {
            return path.to_path_buf();
        }

        let project_root = if current_dir.ends_with("src-tauri") {
            current_dir.parent().unwrap_or(current_dir)
        } else {
            current_dir
        };
        project_root.join(path)
    }
}

/// アプリケーション設定
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 計算デバイスの種類
    #[serde(default)]
    pub device_type: DeviceType,
    /// モデル設定
    #[serde(default)]
    pub model: ModelSettings,
}

impl AppConfig {
    /// 設定ファイルのデフォルトパス
    pub fn default_path() -> PathBuf {
        // src-tauriディレクトリの監視を避けるため、親ディレクトリに保存
        PathBuf::from("../config.json")
    }

    /// 設定を読み込む
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// デフォルトパスから設定を読み込む、存在しない場合はデフォルト設定を返す
    pub fn load_or_default() -> Self {
        Self::load_or_default_from(Self::default_path())
    }

    pub fn load_or_default_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("[config] 設定ファイルが存在しません。デフォルト設定を使用します");
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => {
                info!("[config] 設定ファイルを読み込みました: {}", path.display());
                config
            }
            Err(e) => {
                warn!(
                    "[config] 設定ファイルの読み込みに失敗しました ({}): {}。デフォルト設定を使用します",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// 設定を保存する
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 設定情報をログに出力
    pub fn log_summary(&self) {
        info!("[config] 計算デバイス: {}", self.device_type);
        info!("[config] モデルパス: {}", self.model.model_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.device_type, DeviceType::Cpu);
        assert_eq!(config.model.model_path, "models/heart_disease_model.tar.gz");
    }

    #[test]
    fn test_serialize_deserialize() {
        let mut config = AppConfig::default();
        config.device_type = DeviceType::Wgpu;
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: AppConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.device_type, DeviceType::Wgpu);
        assert_eq!(deserialized.model.model_path, config.model.model_path);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"device_type": "Wgpu"}"#).unwrap();
        assert_eq!(config.device_type, DeviceType::Wgpu);
        assert_eq!(config.model.model_path, "models/heart_disease_model.tar.gz");
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = AppConfig::load_or_default_from(dir.path().join("none.json"));
        assert_eq!(missing.device_type, DeviceType::Cpu);

        let broken_path = dir.path().join("broken.json");
        fs::write(&broken_path, "{ not json").unwrap();
        let broken = AppConfig::load_or_default_from(&broken_path);
        assert_eq!(broken.model.model_path, "models/heart_disease_model.tar.gz");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = AppConfig::default();
        config.model.model_path = "custom/model.tar.gz".to_string();
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.model.model_path, "custom/model.tar.gz");
    }

    #[test]
    fn test_resolve_path_from_src_tauri() {
        let settings = ModelSettings::default();
        let resolved = settings.resolve_path(Path::new("/work/app/src-tauri"));
        assert_eq!(resolved, PathBuf::from("/work/app/models/heart_disease_model.tar.gz"));

        let resolved = settings.resolve_path(Path::new("/work/app"));
        assert_eq!(resolved, PathBuf::from("/work/app/models/heart_disease_model.tar.gz"));
    }

    #[test]
    fn test_device_type_display() {
        assert_eq!(format!("{}", DeviceType::Wgpu), "WGPU (GPU)");
        assert_eq!(format!("{}", DeviceType::Cpu), "CPU (NdArray)");
    }
}
