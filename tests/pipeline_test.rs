//! 判定パイプラインの統合テスト
//!
//! 検索・AI分析を差し替え可能な実装に置き換えて、失敗時の振る舞いを検証

use copyright_check::analyzer::StyleClassifier;
use copyright_check::config::AnalysisSettings;
use copyright_check::error::{CopyrightCheckError, Result};
use copyright_check::hash_compare::PhashComparator;
use copyright_check::pipeline::{AnalysisStep, Pipeline};
use copyright_check::scanner::LoadedImage;
use copyright_check::search::ReverseImageSearch;
use copyright_check_common::{CandidateMatch, LensData, Recommendation, StyleAnalysis, SIMILARITY_FAILED};
use std::cell::Cell;

/// 固定の検索結果を返す（Noneならエラー）
struct FakeSearch {
    matches: Option<Vec<CandidateMatch>>,
}

impl ReverseImageSearch for FakeSearch {
    async fn search(&self, _image: &[u8]) -> Result<LensData> {
        match &self.matches {
            Some(matches) => Ok(LensData {
                visual_matches: matches.clone(),
                ..Default::default()
            }),
            None => Err(CopyrightCheckError::ApiCall("SerpApi: 503".into())),
        }
    }
}

/// 最初の `failures` 回はエラー、その後は固定の結果を返す
struct FakeClassifier {
    failures: usize,
    result: StyleAnalysis,
    calls: Cell<usize>,
}

impl FakeClassifier {
    fn new(failures: usize, result: StyleAnalysis) -> Self {
        Self {
            failures,
            result,
            calls: Cell::new(0),
        }
    }
}

impl StyleClassifier for FakeClassifier {
    async fn classify(&self, _image: &[u8]) -> Result<StyleAnalysis> {
        let n = self.calls.get();
        self.calls.set(n + 1);
        if n < self.failures {
            Err(CopyrightCheckError::ApiCall("timeout".into()))
        } else {
            Ok(self.result.clone())
        }
    }
}

fn safe_style() -> StyleAnalysis {
    StyleAnalysis {
        similar_artists: vec!["Artist X".to_string()],
        style_description: "水彩風の風景".to_string(),
        risk_factors: Vec::new(),
        recommendation: Recommendation::Safe,
    }
}

fn candidate(i: usize, title: &str) -> CandidateMatch {
    CandidateMatch {
        title: title.to_string(),
        link: format!("https://example.com/{}", i),
        // 接続できないアドレス（pHashは -1.0 になる）
        thumbnail: format!("http://127.0.0.1:1/{}.png", i),
        source: "example.com".to_string(),
    }
}

fn comparator() -> PhashComparator {
    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("クライアント生成失敗");
    PhashComparator::with_client(client)
}

fn pipeline(search: FakeSearch, classifier: FakeClassifier) -> Pipeline<FakeSearch, FakeClassifier> {
    Pipeline::new(search, classifier, comparator(), AnalysisSettings::default())
}

/// すべてのシグナルが失敗してもCAUTIONのレポートが1件できる
#[tokio::test]
async fn test_all_signals_fail_gives_caution() {
    let p = pipeline(FakeSearch { matches: None }, FakeClassifier::new(usize::MAX, safe_style()));

    let report = p.analyze("broken.png", b"not an image").await;

    assert_eq!(report.filename(), "broken.png");
    assert!(report.matches().is_empty());
    assert!(report.similarities().is_empty());
    assert_eq!(report.style().style_description, "分析不可");
    assert_eq!(report.overall_recommendation(), Recommendation::Caution);
}

/// 1回目の失敗は再試行で回復する
#[tokio::test]
async fn test_classifier_retried_once() {
    let p = pipeline(FakeSearch { matches: Some(Vec::new()) }, FakeClassifier::new(1, safe_style()));

    let report = p.analyze("a.png", b"bytes").await;

    assert_eq!(report.style().style_description, "水彩風の風景");
    assert_eq!(report.overall_recommendation(), Recommendation::Safe);
}

/// 2回失敗したらフォールバック
#[tokio::test]
async fn test_classifier_fallback_after_two_failures() {
    let classifier = FakeClassifier::new(2, safe_style());
    let p = pipeline(FakeSearch { matches: Some(Vec::new()) }, classifier);

    let report = p.analyze("a.png", b"bytes").await;

    assert_eq!(report.style().style_description, "分析不可");
    assert_eq!(report.overall_recommendation(), Recommendation::Caution);
}

/// 検索エラーは空の結果として扱い、判定は続行する
#[tokio::test]
async fn test_search_error_gives_empty_matches() {
    let p = pipeline(FakeSearch { matches: None }, FakeClassifier::new(0, safe_style()));

    let report = p.analyze("a.png", b"bytes").await;

    assert!(report.matches().is_empty());
    assert_eq!(report.overall_recommendation(), Recommendation::Safe);
}

/// 検索結果のタイトルにアーティスト名があればCAUTION
#[tokio::test]
async fn test_artist_in_search_title_gives_caution() {
    let matches = vec![candidate(0, "landscape"), candidate(1, "artist x fan art")];
    let p = pipeline(FakeSearch { matches: Some(matches) }, FakeClassifier::new(0, safe_style()));

    let report = p.analyze("a.png", b"bytes").await;

    assert_eq!(report.matches().len(), 2);
    assert_eq!(report.overall_recommendation(), Recommendation::Caution);
}

/// サムネイルが取れない・元画像が壊れている場合は -1.0 の記録が残る
#[tokio::test]
async fn test_unscorable_matches_record_sentinel() {
    let matches = vec![candidate(0, "one"), candidate(1, "two")];
    let p = pipeline(FakeSearch { matches: Some(matches) }, FakeClassifier::new(0, safe_style()));

    let report = p.analyze("a.png", b"not an image").await;

    assert_eq!(report.similarities().len(), 2);
    assert!(report.similarities().iter().all(|s| s.similarity == SIMILARITY_FAILED));
    assert_eq!(report.max_similarity(), None);
}

/// 検索結果は表示件数で切り詰め、レポートには最大5件
#[tokio::test]
async fn test_matches_truncated() {
    let matches: Vec<CandidateMatch> = (0..12).map(|i| candidate(i, "title")).collect();
    let settings = AnalysisSettings::new(0.85, 8).expect("設定が不正");
    let p = Pipeline::new(
        FakeSearch { matches: Some(matches) },
        FakeClassifier::new(0, safe_style()),
        comparator(),
        settings,
    );

    let report = p.analyze("a.png", b"bytes").await;

    assert_eq!(report.matches().len(), 5);
    assert_eq!(report.matches()[0].link, "https://example.com/0");
    assert_eq!(report.similarities().len(), 8);
}

/// 表示は5件までだが、判定には取得した全件のタイトルを使う
#[tokio::test]
async fn test_artist_in_seventh_title_gives_caution() {
    let mut matches: Vec<CandidateMatch> = (0..8).map(|i| candidate(i, "landscape")).collect();
    matches[6].title = "Artist X fan art".to_string();
    let settings = AnalysisSettings::new(0.85, 8).expect("設定が不正");
    let p = Pipeline::new(
        FakeSearch { matches: Some(matches) },
        FakeClassifier::new(0, safe_style()),
        comparator(),
        settings,
    );

    let report = p.analyze("a.png", b"bytes").await;

    assert_eq!(report.matches().len(), 5);
    assert_eq!(report.all_matches().count(), 8);
    assert!(report.max_similarity().is_none());
    assert_eq!(report.overall_recommendation(), Recommendation::Caution);
}

/// 進捗は決まった順で通知される
#[tokio::test]
async fn test_progress_order() {
    let p = pipeline(FakeSearch { matches: Some(Vec::new()) }, FakeClassifier::new(0, safe_style()));

    let mut steps = Vec::new();
    p.analyze_with_progress("a.png", b"bytes", |step| steps.push(step)).await;

    assert_eq!(
        steps,
        vec![
            AnalysisStep::LensSearch,
            AnalysisStep::AiAnalysis,
            AnalysisStep::Phash,
            AnalysisStep::Report,
        ]
    );
}

/// 入力1件につきレポート1件、順序も保つ
#[tokio::test]
async fn test_analyze_all_one_report_per_image() {
    let p = pipeline(FakeSearch { matches: None }, FakeClassifier::new(usize::MAX, safe_style()));
    let images: Vec<LoadedImage> = ["c.png", "a.jpg", "b.webp"]
        .iter()
        .map(|name| LoadedImage {
            file_name: name.to_string(),
            bytes: b"bytes".to_vec(),
        })
        .collect();

    let reports = p.analyze_all(&images).await;

    let names: Vec<&str> = reports.iter().map(|r| r.filename()).collect();
    assert_eq!(names, vec!["c.png", "a.jpg", "b.webp"]);
}
