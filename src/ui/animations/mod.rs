mod common;

mod breathe;
mod flash;
mod neon;
mod rainbow;

pub(crate) use common::{Animation, AnimationContext};

use serde::Deserialize;

/// The color effect played on the winner banner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, strum::Display, strum::EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub(crate) enum CelebrationStyle {
    #[default]
    Rainbow,
    Flash,
    Breathe,
    Neon,
}

/// Get the animation implementation for a given style
pub(crate) fn get_animation(style: CelebrationStyle) -> Box<dyn Animation> {
    match style {
        CelebrationStyle::Rainbow => Box::new(rainbow::Rainbow),
        CelebrationStyle::Flash => Box::new(flash::Flash),
        CelebrationStyle::Breathe => Box::new(breathe::Breathe),
        CelebrationStyle::Neon => Box::new(neon::Neon),
    }
}
