//! 類似画像検索
//!
//! 画像を一時ホスティングにアップロードし、そのURLでGoogle Lens (SerpApi) を検索する。

mod serpapi;
mod upload;

pub use serpapi::SerpApiLens;
pub use upload::{direct_link, TmpFilesUploader};

use crate::error::Result;
use copyright_check_common::LensData;

/// 類似画像検索の呼び出し口
#[allow(async_fn_in_trait)]
pub trait ReverseImageSearch {
    async fn search(&self, image: &[u8]) -> Result<LensData>;
}
