//! SerpApi (engine=google_lens) クライアント

use super::upload::TmpFilesUploader;
use super::ReverseImageSearch;
use crate::error::{CopyrightCheckError, Result};
use copyright_check_common::{parse_lens_results, LensData};
use serde_json::Value;

const SERPAPI_URL: &str = "https://serpapi.com/search.json";

pub struct SerpApiLens {
    client: reqwest::Client,
    api_key: String,
    uploader: TmpFilesUploader,
}

impl SerpApiLens {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        let uploader = TmpFilesUploader::new(client.clone());
        Self {
            client,
            api_key,
            uploader,
        }
    }

    /// 公開URLの画像でGoogle Lens検索
    pub async fn search_url(&self, image_url: &str) -> Result<LensData> {
        let response = self
            .client
            .get(SERPAPI_URL)
            .query(&[
                ("engine", "google_lens"),
                ("url", image_url),
                ("hl", "ja"),
                ("country", "jp"),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CopyrightCheckError::ApiCall(format!("SerpApi error: {}", status)));
        }

        let results: Value = response
            .json()
            .await
            .map_err(|e| CopyrightCheckError::ApiParse(format!("SerpApi: {}", e)))?;

        check_error(&results)?;
        Ok(parse_lens_results(results))
    }
}

impl ReverseImageSearch for SerpApiLens {
    async fn search(&self, image: &[u8]) -> Result<LensData> {
        let image_url = self.uploader.upload(image).await?;
        log::debug!("一時URL: {}", image_url);
        self.search_url(&image_url).await
    }
}

/// レスポンス中の "error" キーをエラーにする
fn check_error(results: &Value) -> Result<()> {
    match results.get("error") {
        None | Some(Value::Null) => Ok(()),
        Some(Value::String(message)) => Err(CopyrightCheckError::ApiCall(message.clone())),
        Some(other) => Err(CopyrightCheckError::ApiCall(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_error() {
        assert!(check_error(&json!({"visual_matches": []})).is_ok());

        let err = check_error(&json!({"error": "Invalid API key."})).unwrap_err();
        assert!(matches!(err, CopyrightCheckError::ApiCall(ref m) if m == "Invalid API key."));
    }
}
