//! 一時画像ホスティング（tmpfiles.org）

use crate::error::{CopyrightCheckError, Result};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

const TMPFILES_UPLOAD_URL: &str = "https://tmpfiles.org/api/v1/upload";
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct UploadResponse {
    data: UploadData,
}

#[derive(Deserialize)]
struct UploadData {
    url: String,
}

/// 表示ページのURLを直リンクに変換
///
/// `https://tmpfiles.org/12345/image.png` → `https://tmpfiles.org/dl/12345/image.png`
pub fn direct_link(url: &str) -> String {
    url.replacen("tmpfiles.org/", "tmpfiles.org/dl/", 1)
}

pub struct TmpFilesUploader {
    client: reqwest::Client,
}

impl TmpFilesUploader {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// 画像をアップロードし、公開URL（直リンク）を返す
    pub async fn upload(&self, image: &[u8]) -> Result<String> {
        let part = Part::bytes(image.to_vec())
            .file_name("image.png")
            .mime_str("image/png")?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(TMPFILES_UPLOAD_URL)
            .multipart(form)
            .timeout(UPLOAD_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CopyrightCheckError::ApiCall(format!(
                "tmpfiles.org upload failed: {}",
                status
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| CopyrightCheckError::ApiParse(format!("tmpfiles.org: {}", e)))?;

        Ok(direct_link(&body.data.url))
    }
}
