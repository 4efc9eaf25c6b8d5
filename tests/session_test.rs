//! セッション制御テスト
//!
//! モック判定サービスでのE2E、遅延レスポンスの破棄、手動リトライを検証

use ai_detect_rust::classifier::{Classification, Classifier, ClassifierFailure, ClassifyResult};
use ai_detect_rust::error::AiDetectError;
use ai_detect_rust::history::{HistoryRepository, HistoryStore, MemoryHistoryRepository};
use ai_detect_rust::reveal::certainty_phrase;
use ai_detect_rust::session::{Applied, SessionController, SessionState, MAX_UPLOAD_BYTES};
use ai_detect_rust::verdict::Label;
use async_trait::async_trait;
use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

struct MockClassifier {
    outcome: ClassifyResult,
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(&self, _image: &[u8]) -> ClassifyResult {
        self.outcome.clone()
    }
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([90, 90, 90, 255]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut out, ImageFormat::Png)
        .expect("テスト画像の生成失敗");
    out.into_inner()
}

/// submit → モック判定 → Ready → 保存 までの一連の流れ
#[tokio::test]
async fn test_end_to_end_ai_verdict() {
    let mut controller = SessionController::new();
    let image = png_bytes(200, 300);

    let ticket = controller.begin_submit(image.clone()).expect("submit失敗");
    assert_eq!(controller.state(), SessionState::Loading);

    let classifier = MockClassifier {
        outcome: Ok(Classification {
            class: "AI".to_string(),
            confidence: 96.0,
        }),
    };
    let outcome = classifier.classify(&image).await;

    let verdict = match controller.apply_result(ticket, outcome) {
        Applied::Ready(verdict) => verdict,
        other => panic!("Readyでない: {:?}", other),
    };
    assert_eq!(controller.state(), SessionState::Ready);
    assert_eq!(verdict.label, Label::Ai);
    assert_eq!(verdict.confidence, 96.0);
    assert_eq!(certainty_phrase(verdict.confidence), "with high certainty");

    // 保存: 注釈付き画像の高さは元画像と一致し、永続化形式に元画像は無い
    let repo = MemoryHistoryRepository::new();
    let mut store = HistoryStore::load(repo.clone());
    let session = controller.session().expect("セッションが無い");
    let entry = store.save(session).expect("保存失敗");

    let decoded = image::load_from_memory(&entry.annotated).unwrap();
    assert_eq!(decoded.dimensions(), (200, 300));

    let payload = repo.get().unwrap().expect("ペイロードが無い");
    let parsed: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(parsed[0]["isAI"], serde_json::json!(true));
    assert!(parsed[0].get("original").is_none());
}

/// HUMANクラスはHumanラベルへマップされる
#[tokio::test]
async fn test_human_class_mapping() {
    let mut controller = SessionController::new();
    let ticket = controller.begin_submit(png_bytes(100, 100)).unwrap();

    let applied = controller.apply_result(
        ticket,
        Ok(Classification {
            class: "HUMAN".to_string(),
            confidence: 84.0,
        }),
    );
    match applied {
        Applied::Ready(verdict) => assert_eq!(verdict.label, Label::Human),
        other => panic!("Readyでない: {:?}", other),
    }
}

/// デコードできない入力はネットワークに触れず拒否、状態は変わらない
#[test]
fn test_invalid_input_rejected_before_network() {
    let mut controller = SessionController::new();
    let result = controller.begin_submit(b"not an image".to_vec());

    assert!(matches!(result, Err(AiDetectError::InvalidInput(_))));
    assert_eq!(controller.state(), SessionState::Idle);
    assert!(controller.session().is_none());
}

/// 10MB超の入力はデコードより前に拒否される
#[test]
fn test_oversized_input_rejected() {
    let mut controller = SessionController::new();
    let result = controller.begin_submit(vec![0u8; MAX_UPLOAD_BYTES + 1]);

    assert!(matches!(result, Err(AiDetectError::InvalidInput(_))));
    assert_eq!(controller.state(), SessionState::Idle);
}

/// 差し替え後に届いた旧セッションのレスポンスは破棄される
#[test]
fn test_stale_response_discarded() {
    let mut controller = SessionController::new();
    let old_ticket = controller.begin_submit(png_bytes(100, 100)).unwrap();
    let new_ticket = controller.begin_submit(png_bytes(120, 120)).unwrap();

    let applied = controller.apply_result(
        old_ticket,
        Ok(Classification {
            class: "AI".to_string(),
            confidence: 99.0,
        }),
    );
    assert!(matches!(applied, Applied::Stale));
    // 破棄されたので現行セッションはLoadingのまま
    assert_eq!(controller.state(), SessionState::Loading);
    assert!(controller.verdict().is_none());

    let applied = controller.apply_result(
        new_ticket,
        Ok(Classification {
            class: "HUMAN".to_string(),
            confidence: 60.0,
        }),
    );
    assert!(matches!(applied, Applied::Ready(_)));
}

/// 失敗後は同じ画像のまま手動リトライできる
#[test]
fn test_failure_then_manual_retry() {
    let mut controller = SessionController::new();
    let image = png_bytes(100, 100);
    let ticket = controller.begin_submit(image.clone()).unwrap();

    let applied = controller.apply_result(
        ticket,
        Err(ClassifierFailure::Transport("connection refused".into())),
    );
    match applied {
        Applied::Failed(AiDetectError::Transport(_)) => {}
        other => panic!("Transportでない: {:?}", other),
    }
    assert_eq!(controller.state(), SessionState::Failed);

    // セッション（画像）は保持されている
    let stored = controller.session().expect("セッションが無い");
    assert_eq!(*stored.source_image, image);

    let retry_ticket = controller.begin_retry().expect("リトライ失敗");
    assert_eq!(controller.state(), SessionState::Loading);

    let applied = controller.apply_result(
        retry_ticket,
        Ok(Classification {
            class: "AI".to_string(),
            confidence: 91.0,
        }),
    );
    assert!(matches!(applied, Applied::Ready(_)));
    assert_eq!(controller.state(), SessionState::Ready);
}

/// 構造化エラーはmessage/detailsを保ったままFailedになる
#[test]
fn test_service_failure_surfaces_details() {
    let mut controller = SessionController::new();
    let ticket = controller.begin_submit(png_bytes(100, 100)).unwrap();

    let applied = controller.apply_result(
        ticket,
        Err(ClassifierFailure::Service {
            message: "Image analysis failed".into(),
            details: "The model couldn't analyze this image".into(),
        }),
    );
    match applied {
        Applied::Failed(AiDetectError::Service { message, details }) => {
            assert_eq!(message, "Image analysis failed");
            assert_eq!(details, "The model couldn't analyze this image");
        }
        other => panic!("Serviceでない: {:?}", other),
    }
}

/// Failed以外からのリトライは拒否される
#[test]
fn test_retry_requires_failed_state() {
    let mut controller = SessionController::new();
    assert!(controller.begin_retry().is_err());

    controller.begin_submit(png_bytes(100, 100)).unwrap();
    assert!(controller.begin_retry().is_err());
}

/// リロードのみのエントリをリプレイし、リビールまで通す
#[tokio::test(start_paused = true)]
async fn test_replay_reload_only_entry_end_to_end() {
    use ai_detect_rust::reveal::{RevealEvent, RevealPhase};
    use ai_detect_rust::verdict::{PredictionSession, Verdict};
    use std::sync::Arc;

    let repo = MemoryHistoryRepository::new();
    {
        let mut store = HistoryStore::load(repo.clone());
        store
            .save(&PredictionSession {
                source_image: Arc::new(png_bytes(150, 200)),
                verdict: Some(Verdict::new(Label::Ai, 96.0)),
            })
            .unwrap();
    }

    // リロード相当: 元画像なし → decompose経由のリプレイ
    let store = HistoryStore::load(repo);
    assert!(store.entries()[0].original.is_none());
    let session = store.replay(0).expect("リプレイ失敗");

    let mut controller = SessionController::new();
    controller.adopt_replay(session);
    assert_eq!(controller.state(), SessionState::Ready);

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    controller.start_reveal(tx).expect("リビール開始失敗");

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    assert_eq!(
        events.last(),
        Some(&RevealEvent::Phase(RevealPhase::Done))
    );
}
