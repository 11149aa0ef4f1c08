//! 判定に使う値型
//!
//! - CandidateMatch: 類似画像検索（Google Lens）の1件
//! - SimilarityRecord: サムネイルとのpHash類似度
//! - StyleAnalysis: AI画風分析の結果
//! - Recommendation: SAFE / CAUTION / DANGER の3段階判定

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 類似度を計算できなかったことを表す値
pub const SIMILARITY_FAILED: f64 = -1.0;

/// 類似アーティストの最大件数
pub const MAX_SIMILAR_ARTISTS: usize = 5;

/// 画風説明・フォールバック説明の最大文字数
pub const MAX_DESCRIPTION_CHARS: usize = 200;

/// 3段階の判定（SAFE < CAUTION < DANGER）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Safe,
    Caution,
    Danger,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Safe => "SAFE",
            Recommendation::Caution => "CAUTION",
            Recommendation::Danger => "DANGER",
        }
    }

    /// 一覧表示用のバッジ
    pub fn badge(&self) -> &'static str {
        match self {
            Recommendation::Safe => "🟢 SAFE",
            Recommendation::Caution => "🟡 CAUTION",
            Recommendation::Danger => "🔴 DANGER",
        }
    }

    /// レビュー担当者向けの一言
    pub fn message(&self) -> &'static str {
        match self {
            Recommendation::Safe => "問題なさそうです。既存作品との類似性は低いです",
            Recommendation::Caution => "念のため確認を。似ている部分が見つかりました",
            Recommendation::Danger => "使用は避けてください。既存作品と明らかに似ています",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recommendation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SAFE" => Ok(Recommendation::Safe),
            "CAUTION" => Ok(Recommendation::Caution),
            "DANGER" => Ok(Recommendation::Danger),
            _ => Err(format!("Unknown recommendation: {}. Use SAFE, CAUTION, or DANGER", s)),
        }
    }
}

/// 類似画像検索の1件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateMatch {
    pub title: String,
    pub link: String,
    pub thumbnail: String,
    pub source: String,
}

/// サムネイルとのpHash類似度
///
/// `similarity` は 0.0〜1.0、計算できなかった場合は [`SIMILARITY_FAILED`]。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityRecord {
    pub url: String,
    pub title: String,
    pub similarity: f64,
}

impl SimilarityRecord {
    pub fn for_match(candidate: &CandidateMatch, similarity: f64) -> Self {
        Self {
            url: candidate.link.clone(),
            title: candidate.title.clone(),
            similarity,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.similarity >= 0.0
    }
}

/// 類似画像検索の結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LensData {
    pub visual_matches: Vec<CandidateMatch>,
    pub knowledge_graph: Vec<serde_json::Value>,
    pub raw_response: serde_json::Value,
}

/// AI画風分析の結果
///
/// AIの応答はそのまま信用せず、[`crate::parser::normalize`] を通してから使う。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleAnalysis {
    pub similar_artists: Vec<String>,
    pub style_description: String,
    pub risk_factors: Vec<String>,
    pub recommendation: Recommendation,
}

impl StyleAnalysis {
    /// パースできなかった応答の代わりに使う保守的な結果
    pub fn fallback(raw_response: &str) -> Self {
        Self {
            similar_artists: Vec::new(),
            style_description: truncate_chars(raw_response, MAX_DESCRIPTION_CHARS),
            risk_factors: Vec::new(),
            recommendation: Recommendation::Caution,
        }
    }

    /// AI呼び出しが再試行でも失敗したときの結果
    pub fn unavailable() -> Self {
        Self {
            similar_artists: Vec::new(),
            style_description: "分析不可".to_string(),
            risk_factors: Vec::new(),
            recommendation: Recommendation::Caution,
        }
    }

    /// スキーマの範囲に収める（空の名前は除外、最大5名、説明は200文字まで）
    pub(crate) fn coerce(mut self) -> Self {
        self.similar_artists = self
            .similar_artists
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .take(MAX_SIMILAR_ARTISTS)
            .collect();
        self.risk_factors.retain(|factor| !factor.trim().is_empty());
        self.style_description = truncate_chars(&self.style_description, MAX_DESCRIPTION_CHARS);
        self
    }
}

/// 先頭 `max_chars` 文字を切り出す
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
