//! HTTP判定サービスクライアント
//!
//! multipartで画像を送信し、成功時は `{status, class, confidence}`、
//! 失敗時は `{status, code, message, details}` のJSONを受け取る。

use super::{Classification, Classifier, ClassifyResult, ClassifierFailure};
use crate::error::{AiDetectError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SuccessBody {
    class: String,
    confidence: f64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: Option<String>,
}

pub struct HttpClassifier {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpClassifier {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AiDetectError::Config(format!("HTTPクライアント初期化失敗: {}", e)))?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, image: &[u8]) -> ClassifyResult {
        let part = reqwest::multipart::Part::bytes(image.to_vec())
            .file_name("upload.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| ClassifierFailure::Transport(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClassifierFailure::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClassifierFailure::Transport(e.to_string()))?;

        if !status.is_success() {
            // 構造化エラーが読めればService、読めなければTransport
            return Err(match serde_json::from_str::<ErrorBody>(&body) {
                Ok(err) if !err.message.is_empty() => ClassifierFailure::Service {
                    message: err.message,
                    details: err.details.unwrap_or_default(),
                },
                _ => ClassifierFailure::Transport(format!("HTTP {}", status)),
            });
        }

        serde_json::from_str::<SuccessBody>(&body)
            .map(|b| Classification {
                class: b.class,
                confidence: b.confidence,
            })
            .map_err(|e| ClassifierFailure::Transport(format!("不正なレスポンス: {}", e)))
    }
}
