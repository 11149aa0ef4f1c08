//! 画像ごとのレポート
//!
//! ImageReport は [`build`] でのみ組み立てる。総合判定は常に
//! 保持している入力（画風分析・検索結果・類似度・閾値）から導出される。
//! 表示・CSV用の検索結果は先頭5件だが、判定には渡された全件を使う。

use crate::error::Error;
use crate::recommend::{best_similarity, max_valid_similarity, recommend, Threshold};
use crate::types::{
    CandidateMatch, Recommendation, SimilarityRecord, StyleAnalysis, SIMILARITY_FAILED,
};
use serde::{Deserialize, Serialize};

/// レポートに残す検索結果の最大件数
pub const MAX_REPORT_MATCHES: usize = 5;

/// 解析日時の書式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 1画像分の判定レポート
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredReport")]
pub struct ImageReport {
    filename: String,
    timestamp: String,
    lens_results: Vec<CandidateMatch>,
    /// 表示対象外（6件目以降）の検索結果。判定には使う。
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    extra_lens_results: Vec<CandidateMatch>,
    ai_analysis: StyleAnalysis,
    phash_scores: Vec<SimilarityRecord>,
    phash_threshold: Threshold,
    overall_recommendation: Recommendation,
}

/// 保存済みJSONの読み込み用。総合判定は読み込み時に再計算する。
#[derive(Deserialize)]
struct StoredReport {
    filename: String,
    timestamp: String,
    #[serde(default)]
    lens_results: Vec<CandidateMatch>,
    #[serde(default)]
    extra_lens_results: Vec<CandidateMatch>,
    ai_analysis: StyleAnalysis,
    #[serde(default)]
    phash_scores: Vec<SimilarityRecord>,
    #[serde(default)]
    phash_threshold: Threshold,
}

impl TryFrom<StoredReport> for ImageReport {
    type Error = Error;

    fn try_from(stored: StoredReport) -> Result<Self, Self::Error> {
        if let Some(bad) = stored
            .phash_scores
            .iter()
            .find(|s| !(s.similarity == SIMILARITY_FAILED || (0.0..=1.0).contains(&s.similarity)))
        {
            return Err(Error::Parse(format!(
                "類似度は 0〜1 または -1 である必要があります: {}",
                bad.similarity
            )));
        }

        let mut matches = stored.lens_results;
        matches.extend(stored.extra_lens_results);

        Ok(build_at(
            stored.filename,
            matches,
            stored.ai_analysis,
            stored.phash_scores,
            stored.phash_threshold,
            stored.timestamp,
        ))
    }
}

impl ImageReport {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// 表示用の検索結果（先頭5件まで）
    pub fn matches(&self) -> &[CandidateMatch] {
        &self.lens_results
    }

    /// 判定に使った検索結果すべて
    pub fn all_matches(&self) -> impl Iterator<Item = &CandidateMatch> {
        self.lens_results.iter().chain(&self.extra_lens_results)
    }

    pub fn style(&self) -> &StyleAnalysis {
        &self.ai_analysis
    }

    pub fn similarities(&self) -> &[SimilarityRecord] {
        &self.phash_scores
    }

    pub fn threshold(&self) -> Threshold {
        self.phash_threshold
    }

    pub fn overall_recommendation(&self) -> Recommendation {
        self.overall_recommendation
    }

    /// 検索結果の1位
    pub fn top_match(&self) -> Option<&CandidateMatch> {
        self.lens_results.first()
    }

    pub fn max_similarity(&self) -> Option<f64> {
        max_valid_similarity(&self.phash_scores)
    }

    /// 最も似ているサムネイル
    pub fn best_similarity(&self) -> Option<&SimilarityRecord> {
        best_similarity(&self.phash_scores)
    }
}

/// レポートを生成（解析日時は現在時刻）
pub fn build(
    filename: impl Into<String>,
    matches: Vec<CandidateMatch>,
    style: StyleAnalysis,
    similarities: Vec<SimilarityRecord>,
    threshold: Threshold,
) -> ImageReport {
    let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
    build_at(filename, matches, style, similarities, threshold, timestamp)
}

/// 解析日時を指定してレポートを生成
///
/// 判定は渡された検索結果すべてで行い、表示用には先頭5件（並び順は呼び出し側のまま）を残す。
pub fn build_at(
    filename: impl Into<String>,
    mut matches: Vec<CandidateMatch>,
    style: StyleAnalysis,
    similarities: Vec<SimilarityRecord>,
    threshold: Threshold,
    timestamp: impl Into<String>,
) -> ImageReport {
    let overall_recommendation = recommend(&style, &matches, &similarities, threshold);
    let extra = matches.split_off(matches.len().min(MAX_REPORT_MATCHES));

    ImageReport {
        filename: filename.into(),
        timestamp: timestamp.into(),
        lens_results: matches,
        extra_lens_results: extra,
        ai_analysis: style,
        phash_scores: similarities,
        phash_threshold: threshold,
        overall_recommendation,
    }
}
