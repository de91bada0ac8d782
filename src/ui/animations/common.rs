use crate::wheel::palette::Rgb;

/// Animation context passed to all animation renderers
#[derive(Debug, Clone)]
pub(crate) struct AnimationContext {
    /// Current phase (0-360) - drives animation progression
    pub phase: f32,
    /// Character index within non-whitespace characters
    pub char_index: usize,
    /// Total non-whitespace characters in the banner
    pub total_chars: usize,
}

/// Trait for animation styles
pub(crate) trait Animation {
    /// The color of a single banner character
    fn render_char(&self, ctx: &AnimationContext) -> Rgb;
}
