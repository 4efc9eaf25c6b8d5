//! AI生成画像判定・注釈付き結果共有ツール
//!
//! コアコンポーネント:
//! - compositor: 判定オーバーレイの合成と近似逆変換
//! - history: 上限4件・新しい順のロッシー永続化履歴
//! - reveal: キャンセル可能な段階的リビール演出
//! - session: 判定セッションの状態機械（遅延レスポンスの破棄を含む）

pub mod classifier;
pub mod cli;
pub mod compositor;
pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod reveal;
pub mod session;
pub mod share;
pub mod verdict;
