use super::common::{Animation, AnimationContext};
use crate::wheel::palette::{Rgb, hsl_to_rgb};

/// Neon animation - Bright neon sign colors cycling through classic neon palette
pub(crate) struct Neon;

impl Animation for Neon {
    fn render_char(&self, ctx: &AnimationContext) -> Rgb {
        // hot pink, electric blue, lime green, violet
        let palette = [330.0, 195.0, 85.0, 280.0];
        let palette_len = palette.len() as f32;

        let cycle_position = (ctx.phase + ctx.char_index as f32 * 5.0) % (palette_len * 90.0);
        let palette_index = (cycle_position / 90.0).floor() as usize % palette.len();
        let next_index = (palette_index + 1) % palette.len();

        // blend towards the next palette color
        let t = (cycle_position % 90.0) / 90.0;
        let hue = palette[palette_index] * (1.0 - t) + palette[next_index] * t;

        let pulse = (ctx.phase * 0.1).sin() * 5.0;
        hsl_to_rgb(hue % 360.0, 100.0, 60.0 + pulse)
    }
}
