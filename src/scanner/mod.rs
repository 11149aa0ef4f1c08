use crate::error::{CopyrightCheckError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
}

/// 読み込み済みの画像
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

fn image_info(path: &Path) -> ImageInfo {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    ImageInfo {
        path: path.to_path_buf(),
        file_name,
    }
}

/// フォルダ直下の画像をファイル名順で列挙
pub fn scan_folder(folder: &Path) -> Result<Vec<ImageInfo>> {
    if !folder.is_dir() {
        return Err(CopyrightCheckError::FileNotFound(folder.display().to_string()));
    }

    let mut images: Vec<ImageInfo> = WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| is_image_extension(&ext.to_string_lossy()))
                .unwrap_or(false)
        })
        .map(|e| image_info(e.path()))
        .collect();

    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}

/// 引数のファイル・フォルダから画像を集める
///
/// ファイルは拡張子に関係なく指定順で追加し、フォルダは直下の画像を追加する。
pub fn collect_images(paths: &[PathBuf]) -> Result<Vec<ImageInfo>> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_dir() {
            images.extend(scan_folder(path)?);
        } else if path.is_file() {
            images.push(image_info(path));
        } else {
            return Err(CopyrightCheckError::FileNotFound(path.display().to_string()));
        }
    }

    Ok(images)
}

/// 画像ファイルをすべて読み込む（1件でも失敗したら処理開始前にエラー）
pub fn load_images(images: &[ImageInfo]) -> Result<Vec<LoadedImage>> {
    images
        .iter()
        .map(|img| {
            let bytes = std::fs::read(&img.path)?;
            Ok(LoadedImage {
                file_name: img.file_name.clone(),
                bytes,
            })
        })
        .collect()
}
