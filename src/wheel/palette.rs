/// An RGB display color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Rgb {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

impl Rgb {
    pub(crate) const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub(crate) const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub(crate) const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Perceived brightness in the 0..=1 range.
    pub(crate) fn luma(&self) -> f32 {
        (self.r as f32 * 0.299 + self.g as f32 * 0.587 + self.b as f32 * 0.114) / 255.0
    }

    /// The text color that stays readable on top of this color.
    pub(crate) fn contrasting_text(&self) -> Rgb {
        if self.luma() > 0.5 { Rgb::BLACK } else { Rgb::WHITE }
    }
}

impl From<Rgb> for crossterm::style::Color {
    fn from(color: Rgb) -> Self {
        crossterm::style::Color::Rgb { r: color.r, g: color.g, b: color.b }
    }
}

/// Colors handed out to participants by roster position.
pub(crate) const PARTICIPANT_COLORS: [Rgb; 12] = [
    Rgb::new(0xFF, 0x00, 0x00), // red
    Rgb::new(0x00, 0xFF, 0x00), // green
    Rgb::new(0x00, 0x00, 0xFF), // blue
    Rgb::new(0xFF, 0xFF, 0x00), // yellow
    Rgb::new(0x00, 0xFF, 0xFF), // cyan
    Rgb::new(0xFF, 0x00, 0xFF), // magenta
    Rgb::new(0x88, 0x88, 0x88), // gray
    Rgb::new(0xFF, 0xA5, 0x00), // orange
    Rgb::new(0xFF, 0x14, 0x93), // deep pink
    Rgb::new(0x93, 0x70, 0xDB), // medium purple
    Rgb::new(0x20, 0xB2, 0xAA), // light sea green
    Rgb::new(0xFF, 0x63, 0x47), // tomato
];

/// Number of placeholder slices drawn while the wheel has nobody on it.
pub(crate) const PREVIEW_SLICES: usize = 12;

pub(crate) fn participant_color(roster_index: usize) -> Rgb {
    PARTICIPANT_COLORS[roster_index % PARTICIPANT_COLORS.len()]
}

/// Convert HSL to RGB color
/// H: hue (0-360), S: saturation (0-100), L: lightness (0-100)
pub(crate) fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Rgb {
    let s = s / 100.0;
    let l = l / 100.0;

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Rgb::new(((r + m) * 255.0) as u8, ((g + m) * 255.0) as u8, ((b + m) * 255.0) as u8)
}

/// Generate a rainbow color for a given position
/// total: total number of positions, index: current position (0-based)
pub(crate) fn rainbow_color(index: usize, total: usize) -> Rgb {
    let hue = (index as f32 / total.max(1) as f32) * 360.0;
    hsl_to_rgb(hue, 100.0, 50.0)
}
