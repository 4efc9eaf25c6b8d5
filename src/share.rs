//! 共有コラボレータ
//!
//! 共有先が存在しないことは正常系として検出できる（available）。

use crate::error::Result;
use crate::verdict::{format_confidence, Verdict};

/// 共有時のファイル名
pub const SHARE_FILE_NAME: &str = "ai-analysis.jpg";

/// 共有タイトル
pub const SHARE_TITLE: &str = "AI Image Analysis Result";

/// 共有ペイロード
#[derive(Debug, Clone)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub file_name: String,
    /// 注釈付き画像（エンコード済み）
    pub image: Vec<u8>,
}

impl SharePayload {
    /// 判定と注釈付き画像から共有内容を組み立てる
    pub fn new(verdict: &Verdict, annotated: Vec<u8>) -> Self {
        Self {
            title: SHARE_TITLE.to_string(),
            text: format!(
                "This image is {} with {}% confidence.",
                verdict.label.share_text(),
                format_confidence(verdict.confidence)
            ),
            file_name: SHARE_FILE_NAME.to_string(),
            image: annotated,
        }
    }
}

/// 共有先の抽象
pub trait ShareTarget {
    /// この環境で共有が使えるか
    fn available(&self) -> bool;

    fn share(&self, payload: &SharePayload) -> Result<()>;
}
