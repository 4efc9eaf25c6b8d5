//! 注釈付き画像の書き出し

use crate::error::Result;
use std::path::{Path, PathBuf};

/// ダウンロード時のファイル名
pub const DOWNLOAD_FILE_NAME: &str = "ai-analysis-result.jpg";

/// 注釈付き画像を指定ディレクトリへ書き出す
pub fn write_annotated(dir: &Path, annotated: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(DOWNLOAD_FILE_NAME);
    std::fs::write(&path, annotated)?;
    Ok(path)
}
