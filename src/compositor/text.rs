//! font8x8ビットマップグリフによるオーバーレイテキスト描画

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgba, RgbaImage};

/// font8x8の1グリフの基本ピクセル幅
const GLYPH_SIZE: f64 = 8.0;

/// アルファ合成
pub(crate) fn blend_pixel(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let a = f64::from(src[3]) / 255.0;
    if a <= 0.0 {
        return dst;
    }
    let inv = 1.0 - a;
    let r = (f64::from(dst[0]) * inv + f64::from(src[0]) * a)
        .round()
        .clamp(0.0, 255.0) as u8;
    let g = (f64::from(dst[1]) * inv + f64::from(src[1]) * a)
        .round()
        .clamp(0.0, 255.0) as u8;
    let b = (f64::from(dst[2]) * inv + f64::from(src[2]) * a)
        .round()
        .clamp(0.0, 255.0) as u8;
    let out_a = (f64::from(dst[3]) + f64::from(src[3]) * inv)
        .round()
        .clamp(0.0, 255.0) as u8;
    Rgba([r, g, b, out_a])
}

/// フォントサイズに対する整数グリフ倍率
fn glyph_scale(font_size: f64) -> u32 {
    ((font_size / GLYPH_SIZE).round() as u32).max(1)
}

/// 描画時のテキスト幅（ピクセル）
pub fn measure(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * GLYPH_SIZE * f64::from(glyph_scale(font_size))
}

/// (center_x, center_y)を中心にテキストを描画する
pub fn draw_centered(
    canvas: &mut RgbaImage,
    text: &str,
    center_x: f64,
    center_y: f64,
    font_size: f64,
    color: Rgba<u8>,
) {
    let scale = glyph_scale(font_size);
    let width = measure(text, font_size);
    let x = (center_x - width / 2.0).round() as i32;
    let y = (center_y - GLYPH_SIZE * f64::from(scale) / 2.0).round() as i32;
    draw_text(canvas, x, y, text, color, scale);
    // 1pxずらして重ね描きし擬似ボールドにする
    draw_text(canvas, x + 1, y, text, color, scale);
}

fn draw_text(canvas: &mut RgbaImage, x: i32, y: i32, text: &str, color: Rgba<u8>, scale: u32) {
    let scale_i = scale.max(1) as i32;
    let mut cursor_x = x;
    for ch in text.chars() {
        let glyph = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?'));
        let Some(glyph) = glyph else {
            cursor_x += 8 * scale_i;
            continue;
        };
        for (row_idx, row) in glyph.iter().enumerate() {
            let row_bits = *row;
            for col_idx in 0..8 {
                if (row_bits >> col_idx) & 1 == 0 {
                    continue;
                }
                let px = cursor_x + col_idx * scale_i;
                let py = y + row_idx as i32 * scale_i;
                for sy in 0..scale_i {
                    for sx in 0..scale_i {
                        let tx = px + sx;
                        let ty = py + sy;
                        if tx >= 0
                            && ty >= 0
                            && tx < canvas.width() as i32
                            && ty < canvas.height() as i32
                        {
                            let dst = *canvas.get_pixel(tx as u32, ty as u32);
                            canvas.put_pixel(tx as u32, ty as u32, blend_pixel(dst, color));
                        }
                    }
                }
            }
        }
        cursor_x += 8 * scale_i;
    }
}
