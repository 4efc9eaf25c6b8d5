//! 判定履歴ストア
//!
//! 新しい順・最大4件。永続化時は元画像を意図的に落とす（lossy契約）。
//! リロード後のリプレイはdecomposeによる近似復元で行う。

mod storage;

pub use storage::{
    decode_data_url, extract_base64_from_data_url, extract_mime_type_from_data_url, to_data_url,
    FileHistoryRepository, HistoryRepository, MemoryHistoryRepository, StoredPrediction,
};

use crate::compositor;
use crate::error::{AiDetectError, Result};
use crate::verdict::{Label, PredictionSession, Verdict};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// 履歴の最大保持件数
pub const MAX_HISTORY_ITEMS: usize = 4;

/// 履歴1件
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// 注釈付き画像（エンコード済み）
    pub annotated: Vec<u8>,
    pub label: Label,
    pub confidence: f64,
    pub produced_at: DateTime<Utc>,
    /// 元画像。保存したセッション中のみ保持され、リロード後は常にNone
    pub original: Option<Arc<Vec<u8>>>,
}

impl HistoryEntry {
    pub fn verdict(&self) -> Verdict {
        Verdict::at(self.label, self.confidence, self.produced_at)
    }
}

pub struct HistoryStore<R: HistoryRepository> {
    repo: R,
    entries: Vec<HistoryEntry>,
}

impl<R: HistoryRepository> HistoryStore<R> {
    /// 起動時ロード。読めない・壊れたペイロードは空履歴として扱う（エラーにしない）
    pub fn load(repo: R) -> Self {
        let entries = Self::read_entries(&repo).unwrap_or_default();
        Self { repo, entries }
    }

    fn read_entries(repo: &R) -> Option<Vec<HistoryEntry>> {
        let payload = repo.get().ok()??;
        let stored: Vec<StoredPrediction> = serde_json::from_str(&payload).ok()?;
        let mut entries = Vec::new();
        for item in stored.into_iter().take(MAX_HISTORY_ITEMS) {
            let annotated = storage::decode_data_url(&item.img_data)?;
            let produced_at = DateTime::parse_from_rfc3339(&item.timestamp)
                .ok()?
                .with_timezone(&Utc);
            entries.push(HistoryEntry {
                annotated,
                label: Label::from_is_ai(item.is_ai),
                confidence: item.confidence,
                produced_at,
                original: None,
            });
        }
        Some(entries)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 現在のセッションを履歴へ保存する。判定が無ければエラー
    pub fn save(&mut self, session: &PredictionSession) -> Result<&HistoryEntry> {
        let verdict = session.verdict.as_ref().ok_or(AiDetectError::MissingVerdict)?;
        let annotated = compositor::compose(&session.source_image, verdict)?;
        let entry = HistoryEntry {
            annotated,
            label: verdict.label,
            confidence: verdict.confidence,
            produced_at: verdict.produced_at,
            original: Some(Arc::clone(&session.source_image)),
        };
        self.entries.insert(0, entry);
        // 上限超過分は元画像ごと破棄する（退避はしない）
        self.entries.truncate(MAX_HISTORY_ITEMS);
        self.persist()?;
        Ok(&self.entries[0])
    }

    /// 履歴エントリからセッションを再構築する。元画像が無ければdecomposeで近似復元
    pub fn replay(&self, index: usize) -> Result<PredictionSession> {
        let entry = self
            .entries
            .get(index)
            .ok_or(AiDetectError::HistoryIndex(index))?;
        let source_image = match &entry.original {
            Some(original) => Arc::clone(original),
            None => Arc::new(compositor::decompose(&entry.annotated)?),
        };
        Ok(PredictionSession {
            source_image,
            verdict: Some(entry.verdict()),
        })
    }

    /// 全履歴と耐久ストレージを消去する。冪等
    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.repo.clear()
    }

    fn persist(&self) -> Result<()> {
        let stored: Vec<StoredPrediction> = self
            .entries
            .iter()
            .map(|e| StoredPrediction {
                is_ai: e.label.is_ai(),
                confidence: e.confidence,
                timestamp: e.produced_at.to_rfc3339(),
                img_data: storage::to_data_url(compositor::mime_type(&e.annotated), &e.annotated),
            })
            .collect();
        self.repo.put(&serde_json::to_string(&stored)?)
    }
}
