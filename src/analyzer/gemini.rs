//! Gemini API連携（画風分析）
//!
//! 画像をinline dataとして送り、返ってきたテキストを正規化してStyleAnalysisにする。

use super::StyleClassifier;
use crate::error::{CopyrightCheckError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use copyright_check_common::{normalize, StyleAnalysis, ANALYSIS_PROMPT};
use serde::{Deserialize, Serialize};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini APIリクエスト
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

/// Gemini APIレスポンス
#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// 画像バイト列からMIMEタイプを推定（不明ならPNG扱い）
fn mime_type_for(image: &[u8]) -> &'static str {
    image::guess_format(image)
        .map(|format| format.to_mime_type())
        .unwrap_or("image/png")
}

fn build_request(image: &[u8]) -> GeminiRequest {
    GeminiRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![
                Part::Text {
                    text: ANALYSIS_PROMPT.to_string(),
                },
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: mime_type_for(image).to_string(),
                        data: STANDARD.encode(image),
                    },
                },
            ],
        }],
        generation_config: GenerationConfig {
            temperature: 0.2,
            response_mime_type: "application/json".to_string(),
        },
    }
}

/// 最初の候補のテキストを取り出す
fn response_text(response: GeminiResponse) -> Result<String> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|content| content.parts.into_iter().find_map(|p| p.text))
        .ok_or_else(|| CopyrightCheckError::ApiParse("Gemini: 空のレスポンス".into()))
}

pub struct GeminiClassifier {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClassifier {
    pub fn new(client: reqwest::Client, api_key: String, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
        }
    }

    /// generateContent を呼び、応答テキストをそのまま返す
    pub async fn generate(&self, image: &[u8]) -> Result<String> {
        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, self.model);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&build_request(image))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CopyrightCheckError::ApiCall(format!(
                "Gemini API error {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let payload: GeminiResponse = response
            .json()
            .await
            .map_err(|e| CopyrightCheckError::ApiParse(format!("Gemini: {}", e)))?;

        response_text(payload)
    }
}

impl StyleClassifier for GeminiClassifier {
    async fn classify(&self, image: &[u8]) -> Result<StyleAnalysis> {
        let text = self.generate(image).await?;
        let normalized = normalize(&text);
        if normalized.is_fallback() {
            log::warn!("画風分析の応答をパースできませんでした。CAUTIONとして扱います");
        }
        Ok(normalized.into_inner())
    }
}
