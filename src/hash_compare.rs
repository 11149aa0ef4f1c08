//! pHash類似度モジュール
//!
//! 対象画像と参照画像（サムネイルURL）の64bit知覚ハッシュを比較し、
//! `1 - ハミング距離 / 64` を小数第3位で丸めた類似度を返す。
//! 取得・デコードのどこで失敗しても -1.0 を返し、呼び出し側には伝播しない。

use crate::error::{CopyrightCheckError, Result};
use copyright_check_common::{CandidateMatch, SimilarityRecord, SIMILARITY_FAILED};
use futures::future::join_all;
use image::DynamicImage;
use image_hasher::{HashAlg, Hasher, HasherConfig};
use std::time::Duration;

/// ハッシュのビット数（8x8）
pub const HASH_BITS: u32 = 64;

/// サムネイル取得のタイムアウト
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// サムネイルとして受け付ける最大サイズ
pub const MAX_THUMBNAIL_BYTES: u64 = 5 * 1024 * 1024;

fn phash_hasher() -> Hasher {
    HasherConfig::new()
        .hash_size(8, 8)
        .hash_alg(HashAlg::Mean)
        .preproc_dct()
        .to_hasher()
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

pub struct PhashComparator {
    client: reqwest::Client,
    hasher: Hasher,
}

impl PhashComparator {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client))
    }

    /// 独自に構成したHTTPクライアントを使う
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            hasher: phash_hasher(),
        }
    }

    /// 2枚の画像の類似度（0.0〜1.0）
    pub fn similarity_between(&self, target: &DynamicImage, reference: &DynamicImage) -> f64 {
        let distance = self
            .hasher
            .hash_image(target)
            .dist(&self.hasher.hash_image(reference));
        round3(1.0 - distance as f64 / HASH_BITS as f64)
    }

    /// エンコード済み画像バイト列との類似度。デコードできなければ -1.0
    pub fn similarity_from_bytes(&self, target: &DynamicImage, reference: &[u8]) -> f64 {
        match image::load_from_memory(reference) {
            Ok(reference) => self.similarity_between(target, &reference),
            Err(e) => {
                log::warn!("参照画像をデコードできません: {}", e);
                SIMILARITY_FAILED
            }
        }
    }

    /// サムネイルURLの画像との類似度。失敗時は -1.0
    pub async fn compare(&self, target: &DynamicImage, reference_url: &str) -> f64 {
        match self.fetch_and_compare(target, reference_url).await {
            Ok(similarity) => similarity,
            Err(e) => {
                log::warn!("pHash計算に失敗 ({}): {}", reference_url, e);
                SIMILARITY_FAILED
            }
        }
    }

    async fn fetch_and_compare(&self, target: &DynamicImage, reference_url: &str) -> Result<f64> {
        let response = self
            .client
            .get(reference_url)
            .send()
            .await?
            .error_for_status()?;

        if let Some(length) = response.content_length() {
            check_size(length)?;
        }
        let bytes = response.bytes().await?;
        check_size(bytes.len() as u64)?;

        let reference = image::load_from_memory(&bytes)
            .map_err(|e| CopyrightCheckError::ImageLoad(format!("{}: {}", reference_url, e)))?;

        Ok(self.similarity_between(target, &reference))
    }

    /// 検索結果ごとの類似度を計算（サムネイルがない結果は飛ばす）
    ///
    /// サムネイルは並行して取得し、結果は検索結果の順に並べる。
    /// 対象画像をデコードできなかった場合（`None`）は全件 -1.0。
    pub async fn score_matches(
        &self,
        target: Option<&DynamicImage>,
        matches: &[CandidateMatch],
    ) -> Vec<SimilarityRecord> {
        let scoring = matches
            .iter()
            .filter(|m| !m.thumbnail.is_empty())
            .map(|candidate| async move {
                let similarity = match target {
                    Some(target) => self.compare(target, &candidate.thumbnail).await,
                    None => SIMILARITY_FAILED,
                };
                log::debug!("pHash {} -> {}", candidate.thumbnail, similarity);
                SimilarityRecord::for_match(candidate, similarity)
            });

        join_all(scoring).await
    }
}

fn check_size(length: u64) -> Result<()> {
    if length > MAX_THUMBNAIL_BYTES {
        return Err(CopyrightCheckError::ImageLoad(format!(
            "サムネイルが大きすぎます: {} bytes",
            length
        )));
    }
    Ok(())
}
