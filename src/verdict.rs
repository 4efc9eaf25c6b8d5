//! 判定結果とセッションの型定義

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// 判定ラベル（2値）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Ai,
    Human,
}

impl Label {
    pub fn from_is_ai(is_ai: bool) -> Self {
        if is_ai {
            Label::Ai
        } else {
            Label::Human
        }
    }

    pub fn is_ai(&self) -> bool {
        matches!(self, Label::Ai)
    }

    /// オーバーレイに焼き込む表記
    pub fn overlay_text(&self) -> &'static str {
        match self {
            Label::Ai => "AI-GENERATED",
            Label::Human => "HUMAN-CREATED",
        }
    }

    /// 履歴一覧での表記
    pub fn display_name(&self) -> &'static str {
        match self {
            Label::Ai => "AI-Generated",
            Label::Human => "Human-Created",
        }
    }

    /// 共有テキストでの表記
    pub fn share_text(&self) -> &'static str {
        match self {
            Label::Ai => "AI-generated",
            Label::Human => "human-created",
        }
    }
}

/// 1回の判定結果。作成後は不変
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub label: Label,
    pub confidence: f64,
    pub produced_at: DateTime<Utc>,
}

impl Verdict {
    /// 現在時刻つきで作成。confidenceは[0,100]に丸める
    pub fn new(label: Label, confidence: f64) -> Self {
        Self::at(label, confidence, Utc::now())
    }

    pub fn at(label: Label, confidence: f64, produced_at: DateTime<Utc>) -> Self {
        Self {
            label,
            confidence: confidence.clamp(0.0, 100.0),
            produced_at,
        }
    }
}

/// 現在の判定セッション。新しいアップロードや履歴リプレイで丸ごと差し替える
#[derive(Debug, Clone)]
pub struct PredictionSession {
    /// 元画像（エンコード済みバイト列）
    pub source_image: Arc<Vec<u8>>,
    pub verdict: Option<Verdict>,
}

/// 信頼度の表示用文字列（96.0 → "96"、95.5 → "95.5"）
pub fn format_confidence(confidence: f64) -> String {
    format!("{}", confidence)
}
