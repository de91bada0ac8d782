use super::common::{Animation, AnimationContext};
use crate::wheel::palette::{Rgb, hsl_to_rgb};

/// Breathe animation - Gentle synchronized breathing effect
pub(crate) struct Breathe;

impl Animation for Breathe {
    fn render_char(&self, ctx: &AnimationContext) -> Rgb {
        let hue = (ctx.char_index as f32 / ctx.total_chars.max(1) as f32) * 360.0;
        // all characters pulse together
        let lightness = 40.0 + 20.0 * (ctx.phase * 0.05).sin();
        hsl_to_rgb(hue % 360.0, 65.0, lightness)
    }
}
