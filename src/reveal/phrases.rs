//! 信頼度に応じた説明文・確度フレーズの選択
//!
//! しきい値表は固定。説明文はラベル毎に6段階、確度フレーズは両ラベル共通の
//! 6段階（しきい値は説明文と別系統）。

use crate::verdict::Label;

/// 説明文のしきい値（下限、降順）
const EXPLANATION_THRESHOLDS: [f64; 5] = [98.0, 93.0, 87.0, 80.0, 70.0];

/// 確度フレーズのしきい値（下限、降順）
const CERTAINTY_THRESHOLDS: [f64; 5] = [98.0, 93.0, 85.0, 75.0, 65.0];

const AI_EXPLANATIONS: [&str; 6] = [
    "Showing clear digital artifacts and unnatural patterns typical of AI generation.",
    "Exhibiting inconsistent textures and unnaturally perfect details characteristic of AI tools.",
    "Displaying subtle symmetry and pixel patterns consistent with AI generation.",
    "Showing some unnatural element arrangements typical of AI rendering.",
    "Containing certain artificial patterns that suggest AI involvement.",
    "Showing some characteristics that might indicate AI processing.",
];

const HUMAN_EXPLANATIONS: [&str; 6] = [
    "Displaying natural imperfections and authentic details typical in human photography.",
    "Showing realistic lighting conditions and natural perspective consistent with human creation.",
    "Exhibiting organic composition and natural element arrangement.",
    "Displaying natural textures and lighting typical of human photography.",
    "Containing authentic elements that suggest human creation.",
    "Showing some characteristics that suggest human involvement.",
];

const CERTAINTY_PHRASES: [&str; 6] = [
    "almost certainly",
    "with high certainty",
    "highly likely",
    "likely",
    "moderately likely",
    "possibly",
];

fn bucket(confidence: f64, thresholds: &[f64; 5]) -> usize {
    thresholds
        .iter()
        .position(|&t| confidence >= t)
        .unwrap_or(thresholds.len())
}

/// 判定理由の説明文（ラベルと信頼度の純関数）
pub fn explanation(confidence: f64, label: Label) -> &'static str {
    let table = match label {
        Label::Ai => &AI_EXPLANATIONS,
        Label::Human => &HUMAN_EXPLANATIONS,
    };
    table[bucket(confidence, &EXPLANATION_THRESHOLDS)]
}

/// 見出しの確度フレーズ（ラベル共通）
pub fn certainty_phrase(confidence: f64) -> &'static str {
    CERTAINTY_PHRASES[bucket(confidence, &CERTAINTY_THRESHOLDS)]
}
