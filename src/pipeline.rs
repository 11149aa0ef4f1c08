//! 1画像ごとの判定処理
//!
//! 検索 → AI画風分析 → pHash類似度 → レポート生成 を順に実行する。
//! どのシグナルが失敗しても、その信号だけを空・-1.0・フォールバックに落として
//! 必ず1件のレポートを返す。

use crate::analyzer::{analyze_style, GeminiClassifier, StyleClassifier};
use crate::config::{AnalysisSettings, Config};
use crate::error::Result;
use crate::hash_compare::PhashComparator;
use crate::scanner::LoadedImage;
use crate::search::{ReverseImageSearch, SerpApiLens};
use copyright_check_common::{build, CandidateMatch, ImageReport};
use std::time::Duration;

/// 検索・AI分析APIのタイムアウト
const API_TIMEOUT: Duration = Duration::from_secs(60);

/// 各ステップの進捗
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStep {
    LensSearch,
    AiAnalysis,
    Phash,
    Report,
}

impl AnalysisStep {
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisStep::LensSearch => "🔎 Google Lens検索を実行中...",
            AnalysisStep::AiAnalysis => "🎨 AI画風分析を実行中...",
            AnalysisStep::Phash => "🔢 pHash類似度を計算中...",
            AnalysisStep::Report => "📝 レポートを生成中...",
        }
    }
}

pub struct Pipeline<S, C> {
    search: S,
    classifier: C,
    comparator: PhashComparator,
    settings: AnalysisSettings,
}

impl Pipeline<SerpApiLens, GeminiClassifier> {
    /// 設定からSerpApi + Geminiのパイプラインを組み立てる
    ///
    /// APIキーがない場合はここでエラーになる（画像の処理前）。
    pub fn from_config(config: &Config, settings: AnalysisSettings) -> Result<Self> {
        let serpapi_key = config.get_serpapi_key()?;
        let gemini_key = config.get_gemini_key()?;

        let client = reqwest::Client::builder().timeout(API_TIMEOUT).build()?;
        let search = SerpApiLens::new(client.clone(), serpapi_key);
        let classifier = GeminiClassifier::new(client, gemini_key, config.gemini_model.clone());
        let comparator = PhashComparator::new(Duration::from_secs(config.timeout_seconds))?;

        Ok(Self::new(search, classifier, comparator, settings))
    }
}

impl<S: ReverseImageSearch, C: StyleClassifier> Pipeline<S, C> {
    pub fn new(search: S, classifier: C, comparator: PhashComparator, settings: AnalysisSettings) -> Self {
        Self {
            search,
            classifier,
            comparator,
            settings,
        }
    }

    pub fn settings(&self) -> AnalysisSettings {
        self.settings
    }

    /// 1画像を判定してレポートを返す
    pub async fn analyze(&self, filename: &str, image: &[u8]) -> ImageReport {
        self.analyze_with_progress(filename, image, |_| {}).await
    }

    /// 進捗コールバック付きで1画像を判定
    pub async fn analyze_with_progress<P>(&self, filename: &str, image: &[u8], mut progress: P) -> ImageReport
    where
        P: FnMut(AnalysisStep),
    {
        let target = match image::load_from_memory(image) {
            Ok(img) => Some(img),
            Err(e) => {
                log::warn!("{}: 画像をデコードできません（pHashは計算しません）: {}", filename, e);
                None
            }
        };

        // 1. Google Lens検索
        progress(AnalysisStep::LensSearch);
        let matches = self.search_matches(filename, image).await;

        // 2. AI画風分析
        progress(AnalysisStep::AiAnalysis);
        let style = analyze_style(&self.classifier, image).await;

        // 3. pHash計算
        progress(AnalysisStep::Phash);
        let similarities = self.comparator.score_matches(target.as_ref(), &matches).await;

        // 4. レポート生成
        progress(AnalysisStep::Report);
        build(filename, matches, style, similarities, self.settings.threshold)
    }

    async fn search_matches(&self, filename: &str, image: &[u8]) -> Vec<CandidateMatch> {
        match self.search.search(image).await {
            Ok(data) => {
                let mut matches = data.visual_matches;
                matches.truncate(self.settings.max_results);
                log::info!("{}: Lens検索 {}件", filename, matches.len());
                matches
            }
            Err(e) => {
                log::warn!("{}: Google Lens検索エラー: {}", filename, e);
                Vec::new()
            }
        }
    }

    /// 画像を1枚ずつ順に判定する。入力1件につき必ず1件のレポート。
    pub async fn analyze_all(&self, images: &[LoadedImage]) -> Vec<ImageReport> {
        let mut reports = Vec::with_capacity(images.len());
        for img in images {
            reports.push(self.analyze(&img.file_name, &img.bytes).await);
        }
        reports
    }
}
