pub(crate) mod palette;
pub(crate) mod spin;

use palette::Rgb;

/// Where the pointer sits in the wheel's own frame, in degrees clockwise from the top.
///
/// Slices are laid out clockwise starting at the top as well, so an unrotated wheel
/// always has the first participant under the pointer.
pub(crate) const POINTER_ANGLE: f64 = 0.0;

/// A player on the active roster.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Participant {
    /// Unique within the roster, used to match the player across the wheel and the leaderboard.
    pub(crate) name: String,
    /// Points earned in the current round.
    pub(crate) score: i64,
    /// The color of this player's slice.
    pub(crate) color: Rgb,
}

impl Participant {
    pub(crate) fn new<S: Into<String>>(name: S, color: Rgb) -> Self {
        Self { name: name.into(), score: 0, color }
    }
}

/// Normalize an angle into `[0, 360)`.
pub(crate) fn normalize_angle(angle: f64) -> f64 {
    let normalized = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negative values up to exactly 360
    if normalized >= 360.0 { 0.0 } else { normalized }
}

/// The angular width of each slice on a wheel with `count` slices.
pub(crate) fn slice_angle(count: usize) -> Option<f64> {
    (count > 0).then(|| 360.0 / count as f64)
}

/// The slice covering `wheel_angle`, an angle in the wheel's own (unrotated) frame.
pub(crate) fn slice_at(wheel_angle: f64, count: usize) -> Option<usize> {
    let slice = slice_angle(count)?;
    let index = (normalize_angle(wheel_angle) / slice).floor() as usize;
    Some(index % count)
}

/// The slice under the pointer once the wheel has been rotated clockwise by `angle` degrees.
pub(crate) fn winner_index(angle: f64, count: usize) -> Option<usize> {
    slice_at(POINTER_ANGLE - angle, count)
}

/// Resolve the participant under the pointer for a wheel rotated by `angle` degrees.
pub(crate) fn compute_winner(angle: f64, participants: &[Participant]) -> Option<&Participant> {
    let index = winner_index(angle, participants.len())?;
    participants.get(index)
}
