//! CSV出力（共通ライブラリ）
//!
//! 列の順序と有無は固定。値がない列も空文字で出力する。

use crate::report::ImageReport;
use std::borrow::Cow;

/// CSVヘッダー
pub const CSV_HEADERS: [&str; 9] = [
    "filename",
    "analyzed_at",
    "overall_recommendation",
    "similar_artists",
    "style_description",
    "risk_factors",
    "top_lens_result_title",
    "top_lens_result_url",
    "max_phash_similarity",
];

/// 1レポート分の列値（ヘッダーと同じ順序）
pub fn report_row(report: &ImageReport) -> [String; 9] {
    let style = report.style();
    let top = report.top_match();

    [
        report.filename().to_string(),
        report.timestamp().to_string(),
        report.overall_recommendation().to_string(),
        style.similar_artists.join(", "),
        style.style_description.clone(),
        style.risk_factors.join(", "),
        top.map(|m| m.title.clone()).unwrap_or_default(),
        top.map(|m| m.link.clone()).unwrap_or_default(),
        report
            .max_similarity()
            .map(|s| s.to_string())
            .unwrap_or_default(),
    ]
}

/// レポート一覧をCSV文字列に変換
pub fn serialize(reports: &[ImageReport]) -> String {
    let mut lines = Vec::with_capacity(reports.len() + 1);
    lines.push(CSV_HEADERS.join(","));

    for report in reports {
        let row = report_row(report);
        let fields: Vec<Cow<'_, str>> = row.iter().map(|f| escape_csv_field(f)).collect();
        lines.push(fields.join(","));
    }

    lines.join("\n")
}

fn escape_csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::Threshold;
    use crate::report::build_at;
    use crate::types::{CandidateMatch, Recommendation, SimilarityRecord, StyleAnalysis};

    fn sample_report() -> ImageReport {
        let matches = vec![
            CandidateMatch {
                title: "Artist X fan art".to_string(),
                link: "https://example.com/x".to_string(),
                thumbnail: "https://example.com/x.jpg".to_string(),
                source: "example.com".to_string(),
            },
            CandidateMatch {
                title: "second".to_string(),
                link: "https://example.com/2".to_string(),
                ..Default::default()
            },
        ];
        let style = StyleAnalysis {
            similar_artists: vec!["Artist X".to_string(), "Artist Y".to_string()],
            style_description: "水彩風, やわらかい".to_string(),
            risk_factors: vec!["キャラクターに似ている".to_string()],
            recommendation: Recommendation::Safe,
        };
        let sims = vec![
            SimilarityRecord::for_match(&matches[0], 0.5),
            SimilarityRecord::for_match(&matches[1], -1.0),
        ];
        build_at("art.png", matches, style, sims, Threshold::default(), "2025-01-01 09:30:00")
    }

    #[test]
    fn test_header_only_for_empty() {
        let csv = serialize(&[]);
        assert_eq!(
            csv,
            "filename,analyzed_at,overall_recommendation,similar_artists,style_description,risk_factors,top_lens_result_title,top_lens_result_url,max_phash_similarity"
        );
    }

    #[test]
    fn test_serialize_row() {
        let csv = serialize(&[sample_report()]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "art.png,2025-01-01 09:30:00,CAUTION,\"Artist X, Artist Y\",\"水彩風, やわらかい\",キャラクターに似ている,Artist X fan art,https://example.com/x,0.5"
        );
    }

    #[test]
    fn test_row_without_matches_or_scores() {
        let style = StyleAnalysis::unavailable();
        let report = build_at("none.png", Vec::new(), style, Vec::new(), Threshold::default(), "t");
        let row = report_row(&report);

        assert_eq!(row.len(), CSV_HEADERS.len());
        assert_eq!(row[2], "CAUTION");
        assert_eq!(row[6], "");
        assert_eq!(row[7], "");
        assert_eq!(row[8], "");
    }

    #[test]
    fn test_escape_csv_field() {
        assert_eq!(escape_csv_field("plain"), "plain");
        assert_eq!(escape_csv_field("a,b"), "\"a,b\"");
        assert_eq!(escape_csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv_field("line\nbreak"), "\"line\nbreak\"");
    }
}
