//! レポートのファイル出力（CSV / Excel / JSON）

use crate::cli::ExportFormat;
use crate::error::{CopyrightCheckError, Result};
use copyright_check_common::export::excel_core::generate_excel_buffer;
use copyright_check_common::{serialize, ImageReport};
use std::path::{Path, PathBuf};

pub const DEFAULT_REPORT_NAME: &str = "copyright_check_report";

fn output_path_for_format(output: &Path, extension: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", DEFAULT_REPORT_NAME, extension))
    } else {
        output.with_extension(extension)
    }
}

pub fn write_csv(reports: &[ImageReport], path: &Path) -> Result<()> {
    std::fs::write(path, serialize(reports))?;
    Ok(())
}

pub fn write_excel(reports: &[ImageReport], path: &Path) -> Result<()> {
    let buffer = generate_excel_buffer(reports).map_err(CopyrightCheckError::ExcelGeneration)?;
    std::fs::write(path, buffer)?;
    Ok(())
}

/// 再エクスポート用にレポートをJSONで保存
pub fn write_json(reports: &[ImageReport], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(reports)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// 保存済みのレポートJSONを読み込む（総合判定は読み込み時に再計算される）
pub fn read_json(path: &Path) -> Result<Vec<ImageReport>> {
    if !path.exists() {
        return Err(CopyrightCheckError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// 形式に応じて出力し、書き出したパスを返す
pub fn export_reports(reports: &[ImageReport], format: &ExportFormat, output: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if matches!(format, ExportFormat::Csv | ExportFormat::Both) {
        let path = output_path_for_format(output, "csv");
        write_csv(reports, &path)?;
        written.push(path);
    }

    if matches!(format, ExportFormat::Excel | ExportFormat::Both) {
        let path = output_path_for_format(output, "xlsx");
        write_excel(reports, &path)?;
        written.push(path);
    }

    Ok(written)
}
