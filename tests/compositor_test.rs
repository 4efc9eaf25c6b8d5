//! 合成・復元テスト
//!
//! オーバーレイ合成の高さ保存・配色と、decomposeによる近似復元を検証

use ai_detect_rust::compositor::{compose, decompose, overlay_geometry};
use ai_detect_rust::error::AiDetectError;
use ai_detect_rust::verdict::{Label, Verdict};
use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

/// テスト用のグラデーションPNGを生成
fn png_image(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    });
    encode(DynamicImage::ImageRgba8(img), ImageFormat::Png)
}

fn white_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    encode(DynamicImage::ImageRgba8(img), ImageFormat::Png)
}

fn jpeg_image(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([120, 130, 140]));
    encode(DynamicImage::ImageRgb8(img), ImageFormat::Jpeg)
}

fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).expect("テスト画像の生成失敗");
    out.into_inner()
}

/// 出力の高さは入力と厳密に一致する
#[test]
fn test_compose_preserves_height() {
    let verdict = Verdict::new(Label::Ai, 96.0);
    for (h, overlay) in [(500u32, 40u32), (1000, 80), (2000, 100)] {
        let src = png_image(400, h);
        let out = compose(&src, &verdict).expect("合成失敗");
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.dimensions(), (400, h));
        assert_eq!(overlay_geometry(h).overlay_height, overlay);
    }
}

/// バンドは半透明合成、ボーダーはラベル色で不透明、オーバーレイ外は無変化
#[test]
fn test_compose_band_and_border_colors() {
    let src = white_png(800, 500);
    let out = compose(&src, &Verdict::new(Label::Ai, 96.0)).unwrap();
    let img = image::load_from_memory(&out).unwrap().to_rgba8();

    // 黒バンド（白地に不透明度0.85 → 38）
    let band = img.get_pixel(5, 499);
    assert_eq!([band[0], band[1], band[2]], [38, 38, 38]);

    // アクセントボーダー（AI = 赤 #ff4757）
    let border = img.get_pixel(5, 459);
    assert_eq!([border[0], border[1], border[2]], [255, 71, 87]);

    // オーバーレイ外は白のまま
    let outside = img.get_pixel(5, 456);
    assert_eq!([outside[0], outside[1], outside[2]], [255, 255, 255]);
}

/// HUMAN判定は緑のボーダーになる
#[test]
fn test_compose_human_border_is_green() {
    let src = white_png(800, 500);
    let out = compose(&src, &Verdict::new(Label::Human, 90.0)).unwrap();
    let img = image::load_from_memory(&out).unwrap().to_rgba8();

    let border = img.get_pixel(5, 459);
    assert_eq!([border[0], border[1], border[2]], [46, 213, 115]);
}

/// decompose(compose(img))はバンドが触れなかった上部領域を完全に復元する
#[test]
fn test_decompose_recovers_top_region_exactly() {
    let src = png_image(320, 500);
    let composed = compose(&src, &Verdict::new(Label::Human, 88.0)).unwrap();
    let recovered = decompose(&composed).unwrap();

    let src_img = image::load_from_memory(&src).unwrap().to_rgba8();
    let recovered_img = image::load_from_memory(&recovered).unwrap().to_rgba8();

    let geometry = overlay_geometry(500);
    let visible = 500 - geometry.total();
    assert_eq!(recovered_img.dimensions(), (320, visible));

    for y in 0..visible {
        for x in 0..320 {
            assert_eq!(
                recovered_img.get_pixel(x, y),
                src_img.get_pixel(x, y),
                "画素の不一致: ({}, {})",
                x,
                y
            );
        }
    }
}

/// 入力形式は保存される（PNG→PNG、JPEG→JPEG）
#[test]
fn test_compose_preserves_format() {
    let verdict = Verdict::new(Label::Ai, 75.0);

    let png_out = compose(&png_image(300, 400), &verdict).unwrap();
    assert_eq!(image::guess_format(&png_out).unwrap(), ImageFormat::Png);

    let jpeg_out = compose(&jpeg_image(300, 400), &verdict).unwrap();
    assert_eq!(image::guess_format(&jpeg_out).unwrap(), ImageFormat::Jpeg);

    let decoded = image::load_from_memory(&jpeg_out).unwrap();
    assert_eq!(decoded.dimensions(), (300, 400));
}

/// 読めないバイト列はDecodeエラー
#[test]
fn test_compose_rejects_garbage() {
    let result = compose(b"not an image at all", &Verdict::new(Label::Ai, 50.0));
    assert!(matches!(result, Err(AiDetectError::Decode(_))));
}

#[test]
fn test_decompose_rejects_garbage() {
    let result = decompose(b"\x00\x01\x02\x03");
    assert!(matches!(result, Err(AiDetectError::Decode(_))));
}

/// 切り落とし後の高さが0以下になる画像はDimensionエラー
#[test]
fn test_decompose_rejects_too_short_image() {
    // H=43 → overlay 40 + border 3 = 43 → 残り0
    let result = decompose(&jpeg_image(100, 43));
    assert!(matches!(result, Err(AiDetectError::Dimension(_))));
}

/// 復元は常に（高さ−オーバーレイ）の高さになる
#[test]
fn test_decompose_height() {
    let src = jpeg_image(200, 1000);
    let composed = compose(&src, &Verdict::new(Label::Ai, 99.0)).unwrap();
    let recovered = decompose(&composed).unwrap();
    let decoded = image::load_from_memory(&recovered).unwrap();

    // 1000 → overlay 80 + border 6
    assert_eq!(decoded.dimensions(), (200, 914));
}
