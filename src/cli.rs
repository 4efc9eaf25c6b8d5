use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ai-detect")]
#[command(about = "AI生成画像判定・注釈付き結果共有ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像を判定して結果を表示
    Analyze {
        /// 判定する画像ファイル
        #[arg(required = true)]
        image: PathBuf,

        /// 判定結果を履歴に保存
        #[arg(short, long)]
        save: bool,

        /// 注釈付き画像の書き出し先ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 共有コラボレータへ送信
        #[arg(long)]
        share: bool,

        /// リビール演出を省略して即時表示
        #[arg(long)]
        no_reveal: bool,
    },

    /// 保存済みの判定履歴を一覧表示
    History,

    /// 履歴エントリを再表示
    Replay {
        /// 履歴番号（1が最新）
        #[arg(required = true)]
        index: usize,

        /// 注釈付き画像の書き出し先ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// リビール演出を省略して即時表示
        #[arg(long)]
        no_reveal: bool,
    },

    /// 履歴と耐久ストレージを消去
    Clear {
        /// 確認プロンプトを省略
        #[arg(short, long)]
        yes: bool,
    },

    /// 設定を表示/編集
    Config {
        /// 判定サービスのエンドポイントを設定
        #[arg(long)]
        set_endpoint: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
