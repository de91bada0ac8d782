use crate::wheel::palette::{PREVIEW_SLICES, Rgb, rainbow_color};
use crate::wheel::{Participant, slice_angle, slice_at};
use unicode_width::UnicodeWidthChar;

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f64 = 2.0;

/// Labels sit at this fraction of the radius.
const LABEL_RADIUS: f64 = 0.6;

/// One terminal cell of the wheel picture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Option<Rgb>,
    pub(crate) bg: Option<Rgb>,
}

impl Cell {
    const EMPTY: Cell = Cell { ch: ' ', fg: None, bg: None };
}

/// A slice to draw: its color and, optionally, a label.
struct Slice<'a> {
    color: Rgb,
    label: Option<&'a str>,
}

/// The wheel rasterized into terminal cells, pointer row included.
#[derive(Debug)]
pub(crate) struct WheelView {
    width: usize,
    rows: Vec<Vec<Cell>>,
}

impl WheelView {
    /// Draw `participants` on a wheel rotated clockwise by `rotation` degrees.
    ///
    /// An empty list draws the rainbow preview wheel without labels. The first row holds the
    /// pointer, which sits at the top of the wheel.
    pub(crate) fn render(participants: &[Participant], rotation: f64, radius: u16) -> Self {
        let slices: Vec<Slice> = if participants.is_empty() {
            (0..PREVIEW_SLICES).map(|index| Slice { color: rainbow_color(index, PREVIEW_SLICES), label: None }).collect()
        } else {
            participants.iter().map(|p| Slice { color: p.color, label: Some(p.name.as_str()) }).collect()
        };
        let radius = radius.max(1) as f64;
        let height = (radius * 2.0) as usize + 1;
        let width = (radius * 2.0 * CELL_ASPECT) as usize + 1;
        let center_row = radius;
        let center_col = radius * CELL_ASPECT;

        let mut rows = vec![vec![Cell::EMPTY; width]; height + 1];
        rows[0][center_col as usize] = Cell { ch: '▼', fg: Some(Rgb::WHITE), bg: None };

        for row in 0..height {
            for col in 0..width {
                let dy = row as f64 - center_row;
                let dx = (col as f64 - center_col) / CELL_ASPECT;
                if (dx * dx + dy * dy).sqrt() > radius + 0.25 {
                    continue;
                }
                let screen_angle = dx.atan2(-dy).to_degrees();
                if let Some(index) = slice_at(screen_angle - rotation, slices.len()) {
                    rows[row + 1][col] = Cell { ch: ' ', fg: None, bg: Some(slices[index].color) };
                }
            }
        }

        let slice = slice_angle(slices.len()).unwrap_or(360.0);
        // every label gets at most the chord between neighbouring slice centers
        let max_label = ((radius * LABEL_RADIUS * CELL_ASPECT * (slice.to_radians() / 2.0).sin() * 2.0) as usize).max(1);
        for (index, slice_info) in slices.iter().enumerate() {
            let Some(label) = slice_info.label else { continue };
            let middle = (index as f64 + 0.5) * slice + rotation;
            let radians = middle.to_radians();
            let row = (center_row - radians.cos() * radius * LABEL_RADIUS).round() as usize + 1;
            let label = truncate(label, max_label.min(width / 2));
            let label_width = label.chars().map(|c| c.width().unwrap_or(0)).sum::<usize>();
            let col = (center_col + radians.sin() * radius * LABEL_RADIUS * CELL_ASPECT).round() as usize;
            let start = col.saturating_sub(label_width / 2);
            let text_color = slice_info.color.contrasting_text();
            let mut position = start;
            for ch in label.chars() {
                let Some(cell) = rows.get_mut(row).and_then(|cells| cells.get_mut(position)) else { break };
                cell.ch = ch;
                cell.fg = Some(text_color);
                position += ch.width().unwrap_or(0).max(1);
            }
        }

        Self { width, rows }
    }

    pub(crate) fn width(&self) -> usize {
        self.width
    }

    pub(crate) fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }
}

/// Cut `text` down to `max_width` terminal columns, marking the cut with an ellipsis.
pub(crate) fn truncate(text: &str, max_width: usize) -> String {
    let full: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if full <= max_width {
        return text.to_string();
    }
    let mut output = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let width = ch.width().unwrap_or(0);
        if used + width + 1 > max_width {
            break;
        }
        output.push(ch);
        used += width;
    }
    if max_width > 0 {
        output.push('…');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wheel::palette::participant_color;
    use crate::wheel::winner_index;
    use rstest::rstest;

    fn players(count: usize) -> Vec<Participant> {
        (0..count).map(|index| Participant::new(format!("P{index}"), participant_color(index))).collect()
    }

    /// The cell just below the pointer.
    fn under_pointer(view: &WheelView) -> Cell {
        let center = view.width() / 2;
        view.rows()[2][center]
    }

    #[rstest]
    #[case(4, 0.0)]
    #[case(4, 10.0)]
    #[case(4, 100.0)]
    #[case(3, 200.0)]
    #[case(7, 333.0)]
    fn pointer_slice_is_the_winner(#[case] count: usize, #[case] rotation: f64) {
        let participants = players(count);
        // nudge off slice boundaries so the single sampled cell is unambiguous
        let rotation = rotation + 1.0;
        let view = WheelView::render(&participants, rotation, 8);
        let winner = winner_index(rotation, count).unwrap();
        assert_eq!(under_pointer(&view).bg, Some(participants[winner].color));
    }

    #[test]
    fn pointer_on_top() {
        let view = WheelView::render(&players(2), 0.0, 5);
        assert_eq!(view.rows()[0][view.width() / 2].ch, '▼');
        assert_eq!(view.rows().len(), 12);
        assert_eq!(view.width(), 21);
    }

    #[test]
    fn preview_wheel_has_no_labels() {
        let view = WheelView::render(&[], 0.0, 6);
        let colored = view.rows().iter().flatten().filter(|cell| cell.bg.is_some()).count();
        assert!(colored > 0);
        assert!(view.rows().iter().skip(1).flatten().all(|cell| cell.ch == ' '));
    }

    #[test]
    fn labels_are_drawn() {
        let participants = vec![Participant::new("Ann", participant_color(0)), Participant::new("Zed", participant_color(1))];
        let view = WheelView::render(&participants, 0.0, 8);
        let text: String = view.rows().iter().flatten().map(|cell| cell.ch).filter(|c| c.is_alphabetic()).collect();
        assert!(text.contains("Ann"), "{text}");
        assert!(text.contains("Zed"), "{text}");
    }

    #[rstest]
    #[case("Alice", 10, "Alice")]
    #[case("Alexander", 5, "Alex…")]
    #[case("Alexander", 1, "…")]
    #[case("Bob", 0, "")]
    fn truncates(#[case] text: &str, #[case] width: usize, #[case] expected: &str) {
        assert_eq!(truncate(text, width), expected);
    }
}
