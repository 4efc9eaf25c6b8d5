use ai_detect_rust::classifier::{Classifier, HttpClassifier};
use ai_detect_rust::cli::{Cli, Commands};
use ai_detect_rust::config::Config;
use ai_detect_rust::error::AiDetectError;
use ai_detect_rust::history::{FileHistoryRepository, HistoryStore, MAX_HISTORY_ITEMS};
use ai_detect_rust::reveal::{RevealEvent, RevealPhase, RevealScript};
use ai_detect_rust::session::{Applied, SessionController};
use ai_detect_rust::share::SharePayload;
use ai_detect_rust::verdict::{format_confidence, Verdict};
use ai_detect_rust::{compositor, export};
use anyhow::Context;
use clap::Parser;
use dialoguer::Confirm;
use indicatif::ProgressBar;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Analyze {
            image,
            save,
            output,
            share,
            no_reveal,
        } => {
            println!("🔍 ai-detect - AI生成画像判定\n");

            let bytes = std::fs::read(&image)
                .with_context(|| format!("画像を読み込めません: {}", image.display()))?;

            let mut controller = SessionController::new();

            // 1. 事前検証（デコード不能・サイズ超過はここで弾く）
            println!("[1/2] 画像を検証中...");
            let mut ticket = controller.begin_submit(bytes.clone())?;
            println!("✔ 画像OK: {}\n", image.display());

            // 2. 判定サービス呼び出し
            println!("[2/2] AI解析中...");
            if cli.verbose {
                println!("  エンドポイント: {}", config.endpoint);
            }
            let classifier =
                HttpClassifier::new(&config.endpoint, Duration::from_secs(config.timeout_seconds))?;

            let verdict = loop {
                let spinner = ProgressBar::new_spinner();
                spinner.enable_steady_tick(Duration::from_millis(100));
                spinner.set_message("判定サービスに問い合わせ中...");
                let outcome = classifier.classify(&bytes).await;
                spinner.finish_and_clear();

                match controller.apply_result(ticket, outcome) {
                    Applied::Ready(verdict) => break verdict,
                    Applied::Failed(err) => {
                        match &err {
                            AiDetectError::Service { message, details } => {
                                eprintln!("❌ {}", message);
                                if !details.is_empty() {
                                    eprintln!("   {}", details);
                                }
                            }
                            _ => eprintln!("❌ 接続エラー: サーバーに接続できません"),
                        }
                        // 再試行は常に手動（自動リトライ・バックオフはしない）
                        if std::io::stdin().is_terminal()
                            && Confirm::new()
                                .with_prompt("同じ画像で再試行しますか？")
                                .default(false)
                                .interact()?
                        {
                            ticket = controller.begin_retry()?;
                            continue;
                        }
                        return Err(err.into());
                    }
                    Applied::Stale => {
                        // CLIは逐次実行のため到達しない。破棄して終了
                        return Ok(());
                    }
                }
            };
            println!("✔ 解析完了\n");

            render_result(&mut controller, &verdict, no_reveal).await?;

            if save {
                let mut store = HistoryStore::load(history_repository(&config)?);
                let session = controller.session().ok_or(AiDetectError::MissingVerdict)?;
                store.save(session)?;
                println!("💾 履歴に保存しました（{}件）", store.len());
            }

            if let Some(dir) = output {
                download_annotated(&dir, &bytes, &verdict)?;
            }

            if share {
                share_annotated(&bytes, &verdict)?;
            }
        }

        Commands::History => {
            println!("🗂 判定履歴（新しい順・最大{}件）\n", MAX_HISTORY_ITEMS);

            let store = HistoryStore::load(history_repository(&config)?);
            if store.is_empty() {
                println!("履歴はありません");
                return Ok(());
            }
            for (i, entry) in store.entries().iter().enumerate() {
                println!(
                    "{}. {} - Confidence: {}%  ({})",
                    i + 1,
                    entry.label.display_name(),
                    format_confidence(entry.confidence),
                    entry.produced_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
                );
            }
        }

        Commands::Replay {
            index,
            output,
            no_reveal,
        } => {
            println!("⏪ ai-detect - 履歴リプレイ\n");

            let store = HistoryStore::load(history_repository(&config)?);
            if index == 0 || index > store.len() {
                return Err(AiDetectError::HistoryIndex(index).into());
            }
            // 元画像が残っていなければdecomposeで近似復元される
            let session = store.replay(index - 1)?;
            let source = Arc::clone(&session.source_image);
            let verdict = session.verdict.clone().ok_or(AiDetectError::MissingVerdict)?;

            let mut controller = SessionController::new();
            controller.adopt_replay(session);

            println!("Previous Prediction Result");
            render_result(&mut controller, &verdict, no_reveal).await?;

            if let Some(dir) = output {
                download_annotated(&dir, &source, &verdict)?;
            }
        }

        Commands::Clear { yes } => {
            let mut store = HistoryStore::load(history_repository(&config)?);
            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!("{}件の履歴を削除しますか？", store.len()))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    println!("キャンセルしました");
                    return Ok(());
                }
            }
            store.clear()?;
            println!("🧹 履歴を消去しました");
        }

        Commands::Config { set_endpoint, show } => {
            let mut config = config;
            if let Some(endpoint) = set_endpoint {
                config.set_endpoint(endpoint)?;
                println!("✔ エンドポイントを設定しました");
            }
            if show {
                println!("設定ファイル: {}", Config::config_path()?.display());
                println!("  endpoint: {}", config.endpoint);
                println!("  timeout_seconds: {}", config.timeout_seconds);
                match &config.history_path {
                    Some(path) => println!("  history_path: {}", path.display()),
                    None => println!(
                        "  history_path: （既定: {}）",
                        FileHistoryRepository::default_path()?.display()
                    ),
                }
            }
        }
    }

    Ok(())
}

fn history_repository(config: &Config) -> anyhow::Result<FileHistoryRepository> {
    let path = match &config.history_path {
        Some(path) => path.clone(),
        None => FileHistoryRepository::default_path()?,
    };
    Ok(FileHistoryRepository::new(path))
}

/// リビール演出つきで判定結果を表示する
async fn render_result(
    controller: &mut SessionController,
    verdict: &Verdict,
    no_reveal: bool,
) -> anyhow::Result<()> {
    let script = RevealScript::for_verdict(verdict);

    if no_reveal {
        println!("{}", script.headline);
        println!("{}", script.explanation);
        render_bar(script.bar_target);
        println!("{}", script.confidence_text);
        return Ok(());
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    controller.start_reveal(tx)?;

    let mut stdout = std::io::stdout();
    while let Some(event) = rx.recv().await {
        match event {
            RevealEvent::Phase(RevealPhase::Skeleton) => {
                println!("{}", script.headline);
            }
            RevealEvent::Phase(RevealPhase::BarAnimating) => {}
            RevealEvent::BarTarget(target) => render_bar(target),
            RevealEvent::Phase(RevealPhase::ExplanationTyping) => {}
            RevealEvent::ExplanationChar(ch) => {
                print!("{}", ch);
                stdout.flush()?;
            }
            RevealEvent::Phase(RevealPhase::ConfidenceTyping) => {
                println!();
            }
            RevealEvent::ConfidenceChar(ch) => {
                print!("{}", ch);
                stdout.flush()?;
            }
            RevealEvent::Phase(RevealPhase::Done) => {
                println!();
            }
        }
    }
    Ok(())
}

fn render_bar(target: f64) {
    let filled = ((target / 100.0 * 30.0).round() as usize).min(30);
    println!("[{}{}]", "█".repeat(filled), "░".repeat(30 - filled));
}

fn download_annotated(dir: &Path, source: &[u8], verdict: &Verdict) -> anyhow::Result<PathBuf> {
    let annotated = compositor::compose(source, verdict)?;
    let path = export::write_annotated(dir, &annotated)?;
    println!("⬇ 注釈付き画像を書き出しました: {}", path.display());
    Ok(path)
}

fn share_annotated(source: &[u8], verdict: &Verdict) -> anyhow::Result<()> {
    let annotated = compositor::compose(source, verdict)?;
    let payload = SharePayload::new(verdict, annotated);
    // この環境には共有コラボレータが無い（原実装のnavigator.share欠如と同じ扱い）
    println!("⚠ 共有はこの環境ではサポートされていません");
    println!("  共有テキスト: {}", payload.text);
    Ok(())
}
