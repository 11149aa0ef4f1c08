//! Excel生成（共通ライブラリ）
//!
//! CSVと同じ列構成の1シートを生成する。判定列は判定ごとに色分け。

use super::csv_core::{report_row, CSV_HEADERS};
use crate::report::ImageReport;
use crate::types::Recommendation;
use rust_xlsxwriter::*;

const SHEET_NAME: &str = "判定結果";
const RECOMMENDATION_COL: u16 = 2;
const SIMILARITY_COL: u16 = 8;

fn column_width(col: u16) -> f64 {
    match col {
        0 | 1 => 22.0,
        2 => 18.0,
        4 | 5 => 48.0,
        6 | 7 => 40.0,
        _ => 24.0,
    }
}

fn recommendation_color(rec: Recommendation) -> Color {
    match rec {
        Recommendation::Safe => Color::RGB(0xD4EDDA),
        Recommendation::Caution => Color::RGB(0xFFF3CD),
        Recommendation::Danger => Color::RGB(0xF8D7DA),
    }
}

/// Excelをバッファに生成
pub fn generate_excel_buffer(reports: &[ImageReport]) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0x333333))
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xAAAAAA));

    let value_format = Format::new()
        .set_align(FormatAlign::Top)
        .set_text_wrap()
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));

    let number_format = value_format.clone().set_num_format("0.000");

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(SHEET_NAME)
        .map_err(|e| format!("シート名設定エラー: {}", e))?;

    for (col, header) in CSV_HEADERS.iter().enumerate() {
        let col = col as u16;
        worksheet
            .set_column_width(col, column_width(col))
            .map_err(|e| format!("列幅設定エラー: {}", e))?;
        worksheet
            .write_string_with_format(0, col, *header, &header_format)
            .map_err(|e| format!("ヘッダー書き込みエラー: {}", e))?;
    }
    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| format!("ウィンドウ枠固定エラー: {}", e))?;

    for (index, report) in reports.iter().enumerate() {
        let row = index as u32 + 1;
        let rec_format = value_format
            .clone()
            .set_bold()
            .set_background_color(recommendation_color(report.overall_recommendation()));

        for (col, value) in report_row(report).iter().enumerate() {
            let col = col as u16;
            let result = match col {
                RECOMMENDATION_COL => worksheet.write_string_with_format(row, col, value, &rec_format),
                SIMILARITY_COL => match report.max_similarity() {
                    Some(similarity) => worksheet.write_number_with_format(row, col, similarity, &number_format),
                    None => worksheet.write_string_with_format(row, col, "", &value_format),
                },
                _ => worksheet.write_string_with_format(row, col, value, &value_format),
            };
            result.map_err(|e| format!("値書き込みエラー: {}", e))?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}
