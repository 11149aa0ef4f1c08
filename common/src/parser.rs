//! APIレスポンスパーサー
//!
//! - normalize: AI画風分析の自由文をStyleAnalysisへ変換（失敗時は保守的なフォールバック）
//! - parse_lens_results: SerpApi (Google Lens) のレスポンスをLensDataへ変換

use crate::error::{Error, Result};
use crate::types::{CandidateMatch, LensData, StyleAnalysis};
use serde_json::Value;

/// 正規化の結果
///
/// どちらも同じ形のStyleAnalysisを持つが、フォールバックかどうかを区別できる。
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Ok(StyleAnalysis),
    Fallback(StyleAnalysis),
}

impl Normalized {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Normalized::Fallback(_))
    }

    pub fn style(&self) -> &StyleAnalysis {
        match self {
            Normalized::Ok(style) | Normalized::Fallback(style) => style,
        }
    }

    pub fn into_inner(self) -> StyleAnalysis {
        match self {
            Normalized::Ok(style) | Normalized::Fallback(style) => style,
        }
    }
}

/// Markdownのコードフェンスを外す
///
/// 1行目（```json 等）を捨て、最後の ``` 以降を切り落とす。
/// フェンスで始まるのに改行がない場合はエラー。
///
/// # Examples
/// ```
/// use copyright_check_common::strip_code_fence;
///
/// let body = strip_code_fence("```json\n{\"a\": 1}\n```").unwrap();
/// assert_eq!(body.trim(), "{\"a\": 1}");
/// ```
pub fn strip_code_fence(response: &str) -> Result<&str> {
    let text = response.trim();
    if !text.starts_with("```") {
        return Ok(text);
    }

    let (_, body) = text
        .split_once('\n')
        .ok_or_else(|| Error::Parse("コードフェンスの後に本文がありません".into()))?;

    Ok(match body.rfind("```") {
        Some(end) => &body[..end],
        None => body,
    })
}

/// 画風分析レスポンスを厳密にパース
pub fn parse_style_analysis(response: &str) -> Result<StyleAnalysis> {
    let body = strip_code_fence(response)?;
    let style: StyleAnalysis = serde_json::from_str(body.trim())
        .map_err(|e| Error::Parse(format!("画風分析 JSONパースエラー: {}", e)))?;
    Ok(style.coerce())
}

/// 画風分析レスポンスを正規化する。失敗しない。
///
/// パースに失敗した場合は、先頭200文字を説明に入れたCAUTIONのフォールバックを返す。
pub fn normalize(response: &str) -> Normalized {
    match parse_style_analysis(response) {
        Ok(style) => Normalized::Ok(style),
        Err(_) => Normalized::Fallback(StyleAnalysis::fallback(response)),
    }
}

/// SerpApi (engine=google_lens) のレスポンスをパース
///
/// visual_matches の各要素は文字列でないキーを空文字として扱う。
/// knowledge_graph は配列ならそのまま、単一オブジェクトなら1件の配列にする。
pub fn parse_lens_results(results: Value) -> LensData {
    let visual_matches = results
        .get("visual_matches")
        .and_then(Value::as_array)
        .map(|matches| matches.iter().map(candidate_from_value).collect())
        .unwrap_or_default();

    let knowledge_graph = match results.get("knowledge_graph") {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Null) | None => Vec::new(),
        Some(Value::Object(obj)) if obj.is_empty() => Vec::new(),
        Some(other @ Value::Object(_)) => vec![other.clone()],
        Some(_) => Vec::new(),
    };

    LensData {
        visual_matches,
        knowledge_graph,
        raw_response: results,
    }
}

fn candidate_from_value(value: &Value) -> CandidateMatch {
    let field = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    CandidateMatch {
        title: field("title"),
        link: field("link"),
        thumbnail: field("thumbnail"),
        source: field("source"),
    }
}
