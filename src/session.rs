//! 判定セッションの制御
//!
//! 状態機械: Idle → Loading → {Ready, Failed}。リトライはFailed → Loading。
//! 判定サービスの呼び出し自体は呼び出し側が行い、結果はbegin_submitが発行した
//! 引換券とともにapply_resultへ渡す。世代が一致しない遅延レスポンスは破棄する。

use crate::classifier::{ClassifierFailure, ClassifyResult};
use crate::error::{AiDetectError, Result};
use crate::reveal::{RevealAnimator, RevealEvent, RevealHandle};
use crate::verdict::{Label, PredictionSession, Verdict};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// アップロード上限（判定サービス側の制限に合わせる）
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// begin_submit / begin_retry が発行する引換券
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitTicket {
    generation: u64,
}

/// apply_resultの結果
#[derive(Debug)]
pub enum Applied {
    /// 判定を受理しReadyへ遷移した
    Ready(Verdict),
    /// 失敗を受理しFailedへ遷移した（同じ画像で再試行できる）
    Failed(AiDetectError),
    /// 別セッションに属する遅延レスポンスだったため破棄した
    Stale,
}

pub struct SessionController {
    state: SessionState,
    session: Option<PredictionSession>,
    generation: u64,
    animator: RevealAnimator,
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            session: None,
            generation: 0,
            animator: RevealAnimator::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session(&self) -> Option<&PredictionSession> {
        self.session.as_ref()
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        self.session.as_ref().and_then(|s| s.verdict.as_ref())
    }

    /// 新しい画像で判定を開始する
    ///
    /// デコードできない・大きすぎる入力はネットワークを使わずに拒否し、
    /// 状態は変更しない。受理時はセッションを丸ごと差し替える。
    pub fn begin_submit(&mut self, image: Vec<u8>) -> Result<SubmitTicket> {
        if image.len() > MAX_UPLOAD_BYTES {
            return Err(AiDetectError::InvalidInput(format!(
                "ファイルが大きすぎます（上限10MB、実際{}バイト）",
                image.len()
            )));
        }
        image::load_from_memory(&image)
            .map_err(|e| AiDetectError::InvalidInput(e.to_string()))?;

        self.animator.cancel();
        self.generation += 1;
        self.session = Some(PredictionSession {
            source_image: Arc::new(image),
            verdict: None,
        });
        self.state = SessionState::Loading;
        Ok(SubmitTicket {
            generation: self.generation,
        })
    }

    /// 保存済みの同じ画像で再試行する（Failed状態のみ）
    pub fn begin_retry(&mut self) -> Result<SubmitTicket> {
        if self.state != SessionState::Failed || self.session.is_none() {
            return Err(AiDetectError::InvalidInput(
                "再試行できる失敗セッションがありません".into(),
            ));
        }
        self.animator.cancel();
        self.generation += 1;
        self.state = SessionState::Loading;
        Ok(SubmitTicket {
            generation: self.generation,
        })
    }

    /// 判定サービスの結果を適用する。世代の合わない結果は捨てる
    pub fn apply_result(&mut self, ticket: SubmitTicket, outcome: ClassifyResult) -> Applied {
        if ticket.generation != self.generation {
            return Applied::Stale;
        }
        match outcome {
            Ok(classification) => {
                let label = if classification.class == "AI" {
                    Label::Ai
                } else {
                    Label::Human
                };
                let verdict = Verdict::new(label, classification.confidence);
                if let Some(session) = self.session.as_mut() {
                    session.verdict = Some(verdict.clone());
                }
                self.state = SessionState::Ready;
                Applied::Ready(verdict)
            }
            Err(failure) => {
                self.state = SessionState::Failed;
                Applied::Failed(match failure {
                    ClassifierFailure::Service { message, details } => {
                        AiDetectError::Service { message, details }
                    }
                    ClassifierFailure::Transport(detail) => AiDetectError::Transport(detail),
                })
            }
        }
    }

    /// 履歴リプレイで再構築したセッションを取り込む
    pub fn adopt_replay(&mut self, session: PredictionSession) {
        self.animator.cancel();
        self.generation += 1;
        self.session = Some(session);
        self.state = SessionState::Ready;
    }

    /// 現在の判定でリビール演出を開始する（Readyのみ）
    ///
    /// 進行中のシーケンスは必ず先にキャンセルされる。
    pub fn start_reveal(&mut self, events: UnboundedSender<RevealEvent>) -> Result<&RevealHandle> {
        if self.state != SessionState::Ready {
            return Err(AiDetectError::MissingVerdict);
        }
        let verdict = self
            .session
            .as_ref()
            .and_then(|s| s.verdict.clone())
            .ok_or(AiDetectError::MissingVerdict)?;
        Ok(self.animator.start(&verdict, events))
    }

    /// 進行中のリビール演出を止める
    pub fn cancel_reveal(&mut self) {
        self.animator.cancel();
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}
