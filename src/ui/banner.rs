use crate::ui::animations::{AnimationContext, CelebrationStyle, get_animation};
use crate::wheel::palette::{Rgb, rainbow_color};
use figlet_rs::FIGfont;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};

/// Errors that can occur when generating banners
#[derive(thiserror::Error, Debug)]
pub enum BannerError {
    #[error("failed to load font: {0}")]
    FontLoadFailed(String),

    #[error("failed to convert text '{0}' to ASCII art")]
    ConversionFailed(String),
}

/// Generator for ASCII art banners using the built-in FIGlet font
pub(crate) struct BannerGenerator {
    font: FIGfont,
}

impl BannerGenerator {
    pub(crate) fn new() -> Result<Self, BannerError> {
        // figlet-rs can panic while parsing a font; this only catches it where panics unwind,
        // which excludes the dev profile (panic = "abort")
        let result = catch_unwind(FIGfont::standard);
        match result {
            Ok(Ok(font)) => Ok(Self { font }),
            Ok(Err(e)) => Err(BannerError::FontLoadFailed(e)),
            Err(_) => Err(BannerError::FontLoadFailed("panic during font loading".to_string())),
        }
    }

    /// Generate ASCII art from the given text, one string per row
    pub(crate) fn generate(&self, text: &str) -> Result<Vec<String>, BannerError> {
        let res = catch_unwind(AssertUnwindSafe(|| self.font.convert(text)));
        match res {
            Ok(Some(figure)) => {
                let rendered = figure.to_string();
                let lines: Vec<String> = rendered.lines().map(|line| line.trim_end().to_string()).collect();
                // drop blank padding rows at the bottom
                let used = lines.iter().rposition(|line| !line.is_empty()).map(|last| last + 1).unwrap_or(0);
                if used == 0 {
                    return Err(BannerError::ConversionFailed(text.to_string()));
                }
                Ok(lines[..used].to_vec())
            }
            Ok(None) | Err(_) => Err(BannerError::ConversionFailed(text.to_string())),
        }
    }
}

/// A colored character of a banner row.
pub(crate) type BannerCell = (char, Option<Rgb>);

/// The winner's name, animated for a short while after the wheel stops.
#[derive(Debug)]
pub(crate) struct WinnerBanner {
    name: String,
    lines: Vec<String>,
    style: CelebrationStyle,
    started_at: Instant,
    duration: Duration,
}

impl WinnerBanner {
    /// Build the banner, falling back to the plain name when it can't be drawn as ASCII art.
    pub(crate) fn new(
        name: &str,
        generator: Option<&BannerGenerator>,
        style: CelebrationStyle,
        duration: Duration,
        now: Instant,
    ) -> Self {
        let lines = generator.and_then(|generator| generator.generate(name).ok()).unwrap_or_else(|| vec![name.to_string()]);
        Self { name: name.to_string(), lines, style, started_at: now, duration }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn width(&self) -> usize {
        self.lines.iter().map(|line| line.chars().count()).max().unwrap_or(0)
    }

    pub(crate) fn height(&self) -> usize {
        self.lines.len()
    }

    pub(crate) fn is_animating(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started_at) < self.duration
    }

    /// Animation phase in 0..360, `None` once the animation is over.
    fn phase(&self, now: Instant) -> Option<f32> {
        let elapsed = now.saturating_duration_since(self.started_at);
        if elapsed >= self.duration {
            return None;
        }
        Some(elapsed.as_secs_f32() / self.duration.as_secs_f32() * 360.0)
    }

    /// The banner rows with a color for every non-whitespace character.
    pub(crate) fn render(&self, now: Instant) -> Vec<Vec<BannerCell>> {
        let total_chars =
            self.lines.iter().flat_map(|line| line.chars()).filter(|c| !c.is_whitespace()).count();
        let phase = self.phase(now);
        let animation = get_animation(self.style);
        let mut char_index = 0;
        let mut rows = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            let mut row = Vec::with_capacity(line.len());
            for ch in line.chars() {
                if ch.is_whitespace() {
                    row.push((ch, None));
                    continue;
                }
                let color = match phase {
                    Some(phase) => animation.render_char(&AnimationContext { phase, char_index, total_chars }),
                    None => rainbow_color(char_index, total_chars),
                };
                row.push((ch, Some(color)));
                char_index += 1;
            }
            rows.push(row);
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_font() {
        let generator = BannerGenerator::new().expect("failed to create generator");
        let lines = generator.generate("Alice").expect("failed to generate");
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|line| line == line.trim_end()));
    }

    #[test]
    fn banner_settles_on_static_colors() {
        let now = Instant::now();
        let banner = WinnerBanner::new("Bob", None, CelebrationStyle::Flash, Duration::from_millis(100), now);
        assert_eq!(banner.height(), 1);
        assert_eq!(banner.width(), 3);
        assert!(banner.is_animating(now));

        let later = now + Duration::from_secs(1);
        assert!(!banner.is_animating(later));
        let rows = banner.render(later);
        assert_eq!(rows, vec![vec![('B', Some(rainbow_color(0, 3))), ('o', Some(rainbow_color(1, 3))), ('b', Some(rainbow_color(2, 3)))]]);
    }

    #[test]
    fn whitespace_stays_uncolored() {
        let now = Instant::now();
        let banner = WinnerBanner::new("A B", None, CelebrationStyle::Rainbow, Duration::from_secs(1), now);
        let rows = banner.render(now);
        assert_eq!(rows[0][1], (' ', None));
        assert!(rows[0][0].1.is_some());
    }
}
