//! 総合判定ロジック
//!
//! AI画風分析・類似画像検索・pHash類似度の3つのシグナルから
//! SAFE / CAUTION / DANGER を決める。上から順に評価し、最初に当てはまった規則で確定:
//!
//! 1. AI判定が DANGER → DANGER
//! 2. AI判定が CAUTION → CAUTION
//! 3. 検索結果のタイトルに類似アーティスト名が含まれる（大文字小文字無視） → CAUTION
//! 4. 有効なpHash類似度の最大値が閾値を超える → CAUTION
//! 5. それ以外 → SAFE

use crate::error::{Error, Result};
use crate::types::{CandidateMatch, Recommendation, SimilarityRecord, StyleAnalysis};
use serde::{Deserialize, Serialize};

/// pHash類似度の閾値。0 より大きく 1 以下。
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Threshold(f64);

impl Threshold {
    pub const DEFAULT: f64 = 0.85;

    pub fn new(value: f64) -> Result<Self> {
        if value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(Error::Config(format!(
                "pHash類似度閾値は 0 より大きく 1 以下で指定してください: {}",
                value
            )))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<f64> for Threshold {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Threshold> for f64 {
    fn from(threshold: Threshold) -> Self {
        threshold.0
    }
}

/// 総合判定
pub fn recommend(
    style: &StyleAnalysis,
    matches: &[CandidateMatch],
    similarities: &[SimilarityRecord],
    threshold: Threshold,
) -> Recommendation {
    match style.recommendation {
        Recommendation::Danger => return Recommendation::Danger,
        Recommendation::Caution => return Recommendation::Caution,
        Recommendation::Safe => {}
    }

    if mentions_similar_artist(&style.similar_artists, matches) {
        return Recommendation::Caution;
    }

    if let Some(max) = max_valid_similarity(similarities) {
        if max > threshold.value() {
            return Recommendation::Caution;
        }
    }

    Recommendation::Safe
}

/// 検索結果のタイトルにアーティスト名が含まれるか（単純な部分一致）
pub fn mentions_similar_artist(artists: &[String], matches: &[CandidateMatch]) -> bool {
    if artists.is_empty() || matches.is_empty() {
        return false;
    }

    let artists: Vec<String> = artists.iter().map(|a| a.to_lowercase()).collect();
    matches.iter().any(|m| {
        let title = m.title.to_lowercase();
        artists.iter().any(|artist| title.contains(artist.as_str()))
    })
}

/// 有効な（0以上の）類似度の最大値
pub fn max_valid_similarity(similarities: &[SimilarityRecord]) -> Option<f64> {
    best_similarity(similarities).map(|record| record.similarity)
}

/// 有効な類似度のうち最大のレコード（同値なら先のもの）
pub fn best_similarity(similarities: &[SimilarityRecord]) -> Option<&SimilarityRecord> {
    similarities
        .iter()
        .filter(|record| record.is_valid())
        .fold(None, |best: Option<&SimilarityRecord>, record| match best {
            Some(b) if b.similarity >= record.similarity => Some(b),
            _ => Some(record),
        })
}
