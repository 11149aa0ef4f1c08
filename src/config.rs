use crate::error::{CopyrightCheckError, Result};
use crate::hash_compare::FETCH_TIMEOUT;
use copyright_check_common::Threshold;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lens検索結果の取得件数の範囲
pub const MAX_RESULTS_RANGE: std::ops::RangeInclusive<usize> = 3..=10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub serpapi_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub phash_threshold: f64,
    pub max_lens_results: usize,
    /// サムネイル取得のタイムアウト（秒）
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serpapi_api_key: None,
            gemini_api_key: None,
            gemini_model: "gemini-2.0-flash".into(),
            phash_threshold: Threshold::DEFAULT,
            max_lens_results: 5,
            timeout_seconds: FETCH_TIMEOUT.as_secs(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CopyrightCheckError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("copyright-check").join("config.json"))
    }

    pub fn get_serpapi_key(&self) -> Result<String> {
        // 環境変数を優先
        key_from_env_or("SERPAPI_API_KEY", self.serpapi_api_key.as_deref())
    }

    pub fn get_gemini_key(&self) -> Result<String> {
        key_from_env_or("GEMINI_API_KEY", self.gemini_api_key.as_deref())
    }

    pub fn set_serpapi_key(&mut self, key: String) -> Result<()> {
        self.serpapi_api_key = Some(key);
        self.save()
    }

    pub fn set_gemini_key(&mut self, key: String) -> Result<()> {
        self.gemini_api_key = Some(key);
        self.save()
    }
}

fn key_from_env_or(var: &'static str, stored: Option<&str>) -> Result<String> {
    if let Ok(key) = std::env::var(var) {
        if !key.trim().is_empty() {
            return Ok(key);
        }
    }

    stored
        .filter(|key| !key.trim().is_empty())
        .map(str::to_string)
        .ok_or(CopyrightCheckError::MissingApiKey(var))
}

/// 判定パラメータ（検証済み）
///
/// 画像の処理を始める前に組み立て、範囲外の値はここで設定エラーにする。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisSettings {
    pub threshold: Threshold,
    pub max_results: usize,
}

impl AnalysisSettings {
    pub fn new(threshold: f64, max_results: usize) -> Result<Self> {
        let threshold = Threshold::new(threshold)?;

        if !MAX_RESULTS_RANGE.contains(&max_results) {
            return Err(CopyrightCheckError::Config(format!(
                "Lens検索表示件数は {}〜{} で指定してください: {}",
                MAX_RESULTS_RANGE.start(),
                MAX_RESULTS_RANGE.end(),
                max_results
            )));
        }

        Ok(Self { threshold, max_results })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.phash_threshold, config.max_lens_results)
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            threshold: Threshold::default(),
            max_results: 5,
        }
    }
}
