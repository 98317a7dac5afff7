use macroquad::prelude::*;
use marquee::Config;

use crate::utils::string_to_color;
use crate::FONT_SIZE;

// Text drawn with a one-pixel shadow, scaled with the font size.
fn shadowed(text: &str, x: f32, y: f32, font_size: u16, color: Color) {
    let shadow_offset = 1.0 * (font_size as f32 / FONT_SIZE as f32);

    draw_text_ex(text, x + shadow_offset, y + shadow_offset, TextParams {
        font_size,
        color: Color { r: 0.0, g: 0.0, b: 0.0, a: 0.9 },
        ..Default::default()
    });

    draw_text_ex(text, x, y, TextParams {
        font_size,
        color,
        ..Default::default()
    });
}

/// Text in the configured font colour.
pub fn text_with_config_color(config: &Config, text: &str, x: f32, y: f32, font_size: u16) {
    shadowed(text, x, y, font_size, string_to_color(&config.font_color));
}

pub fn text_disabled(text: &str, x: f32, y: f32, font_size: u16) {
    shadowed(text, x, y, font_size, Color { r: 0.4, g: 0.4, b: 0.4, a: 1.0 });
}

pub fn text_width(text: &str, font_size: u16) -> f32 {
    measure_text(text, None, font_size, 1.0).width
}

/// Pulsing outline around a selected row. `scale` grows it briefly after the cursor moves.
pub fn draw_cursor(x: f32, y: f32, width: f32, height: f32, scale: f32, color: Color) {
    let scaled_width = width * scale;
    let scaled_height = height * scale;
    let offset_x = (scaled_width - width) / 2.0;
    let offset_y = (scaled_height - height) / 2.0;
    draw_rectangle_lines(x - offset_x, y - offset_y, scaled_width, scaled_height, 2.0, color);
}
