use super::common::{Animation, AnimationContext};
use crate::wheel::palette::{Rgb, hsl_to_rgb};

/// Rainbow animation - Full spectrum colors cycling through characters
pub(crate) struct Rainbow;

impl Animation for Rainbow {
    fn render_char(&self, ctx: &AnimationContext) -> Rgb {
        let base_hue = (ctx.char_index as f32 / ctx.total_chars.max(1) as f32) * 360.0;
        let hue = (base_hue + ctx.phase) % 360.0;
        hsl_to_rgb(hue, 100.0, 50.0)
    }
}
