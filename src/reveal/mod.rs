//! 判定結果のリビール演出
//!
//! 単一スレッド協調動作のタイマーシーケンス。フェーズは
//! Skeleton → BarAnimating → ExplanationTyping → ConfidenceTyping → Done。
//! 新しいリビールの開始は進行中のタイマーを必ずキャンセルしてから行う。
//! 1つの表示先に複数シーケンスが交互に書き込む状態は欠陥として扱う。

mod phrases;

pub use phrases::{certainty_phrase, explanation};

use crate::verdict::{format_confidence, Verdict};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// バー伸長開始までの遅延（t=100ms）
const BAR_DELAY: Duration = Duration::from_millis(100);
/// バー開始から説明文タイプ開始までの遅延（t=400ms）
const EXPLANATION_DELAY: Duration = Duration::from_millis(300);
/// 説明文の1文字あたりの間隔
const EXPLANATION_CHAR_INTERVAL: Duration = Duration::from_millis(25);
/// 説明文完了から信頼度タイプ開始までの間隔
const CONFIDENCE_GAP: Duration = Duration::from_millis(200);
/// 信頼度表示の1文字あたりの間隔
const CONFIDENCE_CHAR_INTERVAL: Duration = Duration::from_millis(40);

/// リビールの進行フェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    Skeleton,
    BarAnimating,
    ExplanationTyping,
    ConfidenceTyping,
    Done,
}

/// 演出イベント。表示側はこれを受けて描画する
#[derive(Debug, Clone, PartialEq)]
pub enum RevealEvent {
    Phase(RevealPhase),
    /// バーの目標幅（%）。遷移時間は表示側が持つ
    BarTarget(f64),
    ExplanationChar(char),
    ConfidenceChar(char),
}

/// リビール1回分の台本
#[derive(Debug, Clone)]
pub struct RevealScript {
    pub headline: String,
    pub explanation: &'static str,
    pub confidence_text: String,
    pub bar_target: f64,
}

impl RevealScript {
    pub fn for_verdict(verdict: &Verdict) -> Self {
        Self {
            headline: format!(
                "This image is {} {},",
                phrases::certainty_phrase(verdict.confidence),
                verdict.label.overlay_text()
            ),
            explanation: phrases::explanation(verdict.confidence, verdict.label),
            confidence_text: format!("{}% confidence", format_confidence(verdict.confidence)),
            bar_target: verdict.confidence,
        }
    }
}

/// キャンセル可能なリビールタスクのハンドル
pub struct RevealHandle {
    task: JoinHandle<()>,
}

impl RevealHandle {
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// リビールシーケンスの起動と差し替えを管理する
#[derive(Default)]
pub struct RevealAnimator {
    current: Option<RevealHandle>,
}

impl RevealAnimator {
    pub fn new() -> Self {
        Self { current: None }
    }

    /// 新しいリビールを開始する。進行中のシーケンスは先にキャンセルされる
    pub fn start(&mut self, verdict: &Verdict, events: UnboundedSender<RevealEvent>) -> &RevealHandle {
        self.cancel();
        let script = RevealScript::for_verdict(verdict);
        let task = tokio::spawn(run_sequence(script, events));
        self.current.insert(RevealHandle { task })
    }

    /// 進行中のタイマーを全て止める。未開始なら何もしない
    pub fn cancel(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.cancel();
        }
    }
}

async fn run_sequence(script: RevealScript, events: UnboundedSender<RevealEvent>) {
    // t=0: スケルトン（幅0のバー、空テキスト）
    if events.send(RevealEvent::Phase(RevealPhase::Skeleton)).is_err() {
        return;
    }

    sleep(BAR_DELAY).await;
    if events.send(RevealEvent::Phase(RevealPhase::BarAnimating)).is_err() {
        return;
    }
    if events.send(RevealEvent::BarTarget(script.bar_target)).is_err() {
        return;
    }

    sleep(EXPLANATION_DELAY).await;
    if events
        .send(RevealEvent::Phase(RevealPhase::ExplanationTyping))
        .is_err()
    {
        return;
    }
    for ch in script.explanation.chars() {
        sleep(EXPLANATION_CHAR_INTERVAL).await;
        if events.send(RevealEvent::ExplanationChar(ch)).is_err() {
            return;
        }
    }

    sleep(CONFIDENCE_GAP).await;
    if events
        .send(RevealEvent::Phase(RevealPhase::ConfidenceTyping))
        .is_err()
    {
        return;
    }
    for ch in script.confidence_text.chars() {
        sleep(CONFIDENCE_CHAR_INTERVAL).await;
        if events.send(RevealEvent::ConfidenceChar(ch)).is_err() {
            return;
        }
    }

    let _ = events.send(RevealEvent::Phase(RevealPhase::Done));
}
