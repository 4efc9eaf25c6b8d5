//! 履歴の永続化
//!
//! 耐久ストレージは単一スロット。保存・消去は常にリスト全体の
//! 読み替え・書き換えで行い、部分更新はしない。

use crate::error::{AiDetectError, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// 永続化される1エントリ。元画像は意図的に含めない
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPrediction {
    #[serde(rename = "isAI")]
    pub is_ai: bool,
    pub confidence: f64,
    pub timestamp: String,
    pub img_data: String,
}

/// 耐久ストレージのスロット。get/put/clearの3操作のみ
pub trait HistoryRepository {
    fn get(&self) -> Result<Option<String>>;
    fn put(&self, payload: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// ファイル1個をスロットとして使う本番実装
pub struct FileHistoryRepository {
    path: PathBuf,
}

impl FileHistoryRepository {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// 既定の保存先（設定ディレクトリ直下）
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| AiDetectError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home
            .join(".config")
            .join("ai-detect")
            .join("saved-predictions.json"))
    }
}

impl HistoryRepository for FileHistoryRepository {
    fn get(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&self.path)?))
    }

    fn put(&self, payload: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, payload)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// テスト用のインメモリスロット。クローンは同じスロットを共有する
#[derive(Clone, Default)]
pub struct MemoryHistoryRepository {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(payload: &str) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(payload.to_string()))),
        }
    }
}

impl HistoryRepository for MemoryHistoryRepository {
    fn get(&self) -> Result<Option<String>> {
        Ok(self.slot.lock().unwrap().clone())
    }

    fn put(&self, payload: &str) -> Result<()> {
        *self.slot.lock().unwrap() = Some(payload.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot.lock().unwrap() = None;
        Ok(())
    }
}

/// 画像バイト列をData URLへ
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

/// Data URLからBase64データ部分を抽出
pub fn extract_base64_from_data_url(data_url: &str) -> Option<&str> {
    data_url.split(',').nth(1)
}

/// Data URLからMIMEタイプを抽出（抽出失敗時はimage/jpegをデフォルトとして返す）
pub fn extract_mime_type_from_data_url(data_url: &str) -> &str {
    data_url
        .split(':')
        .nth(1)
        .and_then(|s| s.split(';').next())
        .unwrap_or("image/jpeg")
}

/// Data URLをバイト列へ復元
pub fn decode_data_url(data_url: &str) -> Option<Vec<u8>> {
    let b64 = extract_base64_from_data_url(data_url)?;
    BASE64.decode(b64).ok()
}
