//! 画像判定サービス連携

mod http;

pub use http::HttpClassifier;

use async_trait::async_trait;

/// 判定サービスの成功レスポンス
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// "AI" または "HUMAN"
    pub class: String,
    pub confidence: f64,
}

/// 判定サービスの失敗。構造化エラーとそれ以外を区別する
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierFailure {
    /// サービスが返した構造化エラー（messageとdetailsをそのまま表示する）
    Service { message: String, details: String },
    /// 接続不能・不正レスポンスなど
    Transport(String),
}

pub type ClassifyResult = std::result::Result<Classification, ClassifierFailure>;

/// 判定サービスの抽象。リクエストは生の画像バイト列を運ぶ
#[async_trait]
pub trait Classifier {
    async fn classify(&self, image: &[u8]) -> ClassifyResult;
}
