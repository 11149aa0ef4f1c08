//! 画像著作権リスク判定ツール
//!
//! 類似画像検索（Google Lens）、AI画風分析（Gemini）、pHash類似度の3つのシグナルから
//! 画像ごとに SAFE / CAUTION / DANGER を判定する。判定ロジック本体は
//! `copyright_check_common` にあり、このクレートは外部通信とCLIを担う。

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod hash_compare;
pub mod pipeline;
pub mod scanner;
pub mod search;
