//! AI画風分析
//!
//! 分析呼び出しは1回だけ再試行し、それでも失敗したら
//! CAUTION寄りの固定結果（[`StyleAnalysis::unavailable`]）を使う。

pub mod gemini;

pub use gemini::GeminiClassifier;

use crate::error::Result;
use copyright_check_common::StyleAnalysis;
use std::future::Future;

/// 画風分析の呼び出し口
///
/// 応答が壊れていてもエラーにせず、正規化済みのStyleAnalysisを返すこと。
/// エラーは通信失敗など再試行に値するものに限る。
#[allow(async_fn_in_trait)]
pub trait StyleClassifier {
    async fn classify(&self, image: &[u8]) -> Result<StyleAnalysis>;
}

/// 1回試して失敗したらもう1回、それも失敗したらフォールバック
pub async fn retry_once<T, F, Fut, G>(mut attempt: F, fallback: G) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    G: FnOnce() -> T,
{
    match attempt().await {
        Ok(value) => return value,
        Err(e) => log::warn!("AI画風分析は利用できませんでした（再試行します）: {}", e),
    }

    match attempt().await {
        Ok(value) => value,
        Err(e) => {
            log::warn!("AI画風分析の再試行にも失敗しました: {}", e);
            fallback()
        }
    }
}

/// 画風分析（再試行・フォールバック込み）。失敗しない。
pub async fn analyze_style<C: StyleClassifier>(classifier: &C, image: &[u8]) -> StyleAnalysis {
    retry_once(|| classifier.classify(image), StyleAnalysis::unavailable).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CopyrightCheckError;
    use copyright_check_common::Recommendation;
    use std::cell::Cell;

    fn failing(message: &str) -> Result<u32> {
        Err(CopyrightCheckError::ApiCall(message.to_string()))
    }

    fn succeeding(value: u32) -> Result<u32> {
        Ok(value)
    }

    #[tokio::test]
    async fn test_retry_once_first_success() {
        let calls = Cell::new(0);
        let value = retry_once(
            || {
                calls.set(calls.get() + 1);
                async { succeeding(1) }
            },
            || 0,
        )
        .await;
        assert_eq!(value, 1);
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_retry_once_second_success() {
        let calls = Cell::new(0);
        let value = retry_once(
            || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move { if n == 1 { failing("timeout") } else { succeeding(2) } }
            },
            || 0,
        )
        .await;
        assert_eq!(value, 2);
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_retry_once_fallback_after_two_failures() {
        let calls = Cell::new(0);
        let value = retry_once(
            || {
                calls.set(calls.get() + 1);
                async { failing("down") }
            },
            || 99,
        )
        .await;
        assert_eq!(value, 99);
        assert_eq!(calls.get(), 2);
    }

    struct AlwaysFails;

    impl StyleClassifier for AlwaysFails {
        async fn classify(&self, _image: &[u8]) -> Result<StyleAnalysis> {
            Err(CopyrightCheckError::ApiCall("unavailable".into()))
        }
    }

    #[tokio::test]
    async fn test_analyze_style_fallback() {
        let style = analyze_style(&AlwaysFails, b"image").await;
        assert_eq!(style.recommendation, Recommendation::Caution);
        assert_eq!(style.style_description, "分析不可");
        assert!(style.similar_artists.is_empty());
    }
}
