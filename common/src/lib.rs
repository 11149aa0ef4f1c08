//! Copyright Check Common Library
//!
//! 画像の著作権リスク判定の中核（外部通信なし）:
//! 型定義、AI応答の正規化、総合判定、レポート生成、CSV/Excel出力

pub mod types;
pub mod error;
pub mod parser;
pub mod prompts;
pub mod recommend;
pub mod report;
pub mod export;

pub use types::{
    CandidateMatch, LensData, Recommendation, SimilarityRecord, StyleAnalysis, SIMILARITY_FAILED,
};
pub use error::{Error, Result};
pub use parser::{normalize, parse_lens_results, parse_style_analysis, strip_code_fence, Normalized};
pub use prompts::ANALYSIS_PROMPT;
pub use recommend::{max_valid_similarity, recommend, Threshold};
pub use report::{build, build_at, ImageReport, MAX_REPORT_MATCHES};
pub use export::csv_core::{serialize, CSV_HEADERS};
