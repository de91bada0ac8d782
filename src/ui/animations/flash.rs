use super::common::{Animation, AnimationContext};
use crate::wheel::palette::{Rgb, hsl_to_rgb};

/// Flash animation - Single color that cycles through hue spectrum
pub(crate) struct Flash;

impl Animation for Flash {
    fn render_char(&self, ctx: &AnimationContext) -> Rgb {
        hsl_to_rgb(ctx.phase % 360.0, 100.0, 50.0)
    }
}
