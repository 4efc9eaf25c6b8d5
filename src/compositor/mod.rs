//! 判定オーバーレイの合成・除去
//!
//! - compose: 画像下部に半透明バンド・アクセントボーダー・判定テキストを描画
//! - decompose: 同一のジオメトリ計算で下部を切り落とし、元画像を近似復元
//!
//! ジオメトリは画像の高さのみから決まる純関数で、両方向が同じ計算を共有する。

mod text;

use crate::error::{AiDetectError, Result};
use crate::verdict::{format_confidence, Label, Verdict};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{
    DynamicImage, ExtendedColorType, GenericImageView, ImageEncoder, ImageFormat, Rgba, RgbaImage,
};
use std::io::Cursor;

/// 再エンコード時のJPEG品質
const JPEG_QUALITY: u8 = 95;

/// バンドの不透明度（0.85）
const BAND_ALPHA: u8 = 217;

const AI_ACCENT: Rgba<u8> = Rgba([0xff, 0x47, 0x57, 0xff]);
const HUMAN_ACCENT: Rgba<u8> = Rgba([0x2e, 0xd5, 0x73, 0xff]);

/// オーバーレイのジオメトリ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayGeometry {
    pub overlay_height: u32,
    pub border_height: u32,
}

impl OverlayGeometry {
    /// バンドとボーダーを合わせた高さ
    pub fn total(&self) -> u32 {
        self.overlay_height + self.border_height
    }
}

/// 画像の高さからオーバーレイ寸法を求める。composeとdecomposeの両方がこれを使う
pub fn overlay_geometry(image_height: u32) -> OverlayGeometry {
    let overlay_height = ((f64::from(image_height) * 0.08).floor() as u32).clamp(40, 100);
    let border_height = ((f64::from(overlay_height) * 0.08).floor() as u32).max(3);
    OverlayGeometry {
        overlay_height,
        border_height,
    }
}

fn font_size_for(overlay_height: u32, width: u32) -> f64 {
    let base = (f64::from(overlay_height) * 0.5).clamp(14.0, 24.0);
    base.min(f64::from(width) * 0.04)
}

fn accent_color(label: Label) -> Rgba<u8> {
    match label {
        Label::Ai => AI_ACCENT,
        Label::Human => HUMAN_ACCENT,
    }
}

/// エンコード形式に対応するMIMEタイプ
pub fn mime_type(image_bytes: &[u8]) -> &'static str {
    match image::guess_format(image_bytes) {
        Ok(ImageFormat::Png) => "image/png",
        _ => "image/jpeg",
    }
}

/// 判定オーバーレイを画像へ焼き込む。出力の高さは入力と厳密に一致する
pub fn compose(image_bytes: &[u8], verdict: &Verdict) -> Result<Vec<u8>> {
    let format = image::guess_format(image_bytes)
        .map_err(|e| AiDetectError::Decode(e.to_string()))?;
    let decoded = image::load_from_memory(image_bytes)
        .map_err(|e| AiDetectError::Decode(e.to_string()))?;
    let (width, height) = decoded.dimensions();
    let mut canvas = decoded.to_rgba8();

    let geometry = overlay_geometry(height);
    let accent = accent_color(verdict.label);

    // 半透明の黒バンド（下端からoverlay_height分、上書きではなく合成）
    let band_top = height.saturating_sub(geometry.overlay_height);
    fill_band(&mut canvas, band_top, height, Rgba([0, 0, 0, BAND_ALPHA]));

    // アクセントボーダー（バンド直上、不透明）
    let border_top = band_top.saturating_sub(geometry.border_height);
    fill_band(&mut canvas, border_top, band_top, accent);

    // 中央寄せの判定テキスト
    let label_text = format!(
        "{} ({}% confidence)",
        verdict.label.overlay_text(),
        format_confidence(verdict.confidence)
    );
    let mut font_size = font_size_for(geometry.overlay_height, width);
    let measured = text::measure(&label_text, font_size);
    if measured > f64::from(width) * 0.9 {
        // 幅が収まらない場合は1回だけ縮小して描く（反復はしない）
        font_size = font_size * (f64::from(width) * 0.9) / measured;
    }
    let text_center_y = f64::from(height) - f64::from(geometry.overlay_height) / 2.0;
    text::draw_centered(
        &mut canvas,
        &label_text,
        f64::from(width) / 2.0,
        text_center_y,
        font_size,
        accent,
    );

    encode(&canvas, format)
}

/// 注釈付き画像からオーバーレイを除去し、元画像を近似復元する
///
/// オーバーレイが触れなかった領域のみ復元できる（lossy）。
pub fn decompose(annotated_bytes: &[u8]) -> Result<Vec<u8>> {
    let format = image::guess_format(annotated_bytes)
        .map_err(|e| AiDetectError::Decode(e.to_string()))?;
    let decoded = image::load_from_memory(annotated_bytes)
        .map_err(|e| AiDetectError::Decode(e.to_string()))?;
    let (width, height) = decoded.dimensions();

    let geometry = overlay_geometry(height);
    let visible_height = i64::from(height) - i64::from(geometry.total());
    if visible_height <= 0 {
        return Err(AiDetectError::Dimension(visible_height));
    }

    let cropped = decoded
        .crop_imm(0, 0, width, visible_height as u32)
        .to_rgba8();
    encode(&cropped, format)
}

fn fill_band(canvas: &mut RgbaImage, top: u32, bottom: u32, color: Rgba<u8>) {
    for y in top..bottom.min(canvas.height()) {
        for x in 0..canvas.width() {
            let dst = *canvas.get_pixel(x, y);
            canvas.put_pixel(x, y, text::blend_pixel(dst, color));
        }
    }
}

/// 入力形式を保ってエンコードする。PNGは可逆、それ以外はJPEG品質95
fn encode(canvas: &RgbaImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    match format {
        ImageFormat::Png => {
            PngEncoder::new(&mut out).write_image(
                canvas.as_raw(),
                canvas.width(),
                canvas.height(),
                ExtendedColorType::Rgba8,
            )?;
        }
        _ => {
            let rgb = DynamicImage::ImageRgba8(canvas.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).encode_image(&rgb)?;
        }
    }
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_geometry_table() {
        // floor(H*0.08)を[40,100]でクランプ
        assert_eq!(overlay_geometry(500).overlay_height, 40);
        assert_eq!(overlay_geometry(1000).overlay_height, 80);
        assert_eq!(overlay_geometry(2000).overlay_height, 100);
        assert_eq!(overlay_geometry(100).overlay_height, 40);
    }

    #[test]
    fn test_border_height() {
        // max(3, floor(overlay*0.08))
        assert_eq!(overlay_geometry(500).border_height, 3); // 40*0.08=3.2
        assert_eq!(overlay_geometry(1000).border_height, 6); // 80*0.08=6.4
        assert_eq!(overlay_geometry(2000).border_height, 8); // 100*0.08=8
    }

    #[test]
    fn test_geometry_is_pure() {
        assert_eq!(overlay_geometry(777), overlay_geometry(777));
    }

    #[test]
    fn test_font_size_caps() {
        // clamp(overlay*0.5, 14, 24)をW*0.04で上限
        assert_eq!(font_size_for(40, 1000), 20.0);
        assert_eq!(font_size_for(100, 1000), 24.0);
        assert_eq!(font_size_for(40, 300), 12.0); // 300*0.04=12
        assert_eq!(font_size_for(28, 1000), 14.0); // 下限14
    }
}
