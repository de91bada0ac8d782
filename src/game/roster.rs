use crate::wheel::palette::participant_color;
use crate::wheel::Participant;

/// Split free text into player names.
///
/// Names are separated by newlines or commas, trimmed, and blank entries are dropped.
pub(crate) fn parse_player_names(text: &str) -> Vec<String> {
    text.split(['\n', ','])
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// How an [`Roster::add`] call went.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct AddedPlayers {
    pub(crate) added: usize,
    pub(crate) duplicates: usize,
}

/// Everyone playing this session, plus the subset still on the wheel.
#[derive(Clone, Debug, Default)]
pub(crate) struct Roster {
    participants: Vec<Participant>,
    pool: Vec<Participant>,
}

impl Roster {
    pub(crate) fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// The players that can still be picked by the wheel, in slice order.
    pub(crate) fn pool(&self) -> &[Participant] {
        &self.pool
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Participant> {
        self.participants.iter().find(|participant| participant.name == name)
    }

    /// Add new players and put the whole roster back on the wheel.
    pub(crate) fn add<I>(&mut self, names: I) -> AddedPlayers
    where
        I: IntoIterator<Item = String>,
    {
        let mut outcome = AddedPlayers::default();
        for name in names {
            if self.get(&name).is_some() {
                outcome.duplicates += 1;
                continue;
            }
            let color = participant_color(self.participants.len());
            self.participants.push(Participant::new(name, color));
            outcome.added += 1;
        }
        self.refill_pool();
        outcome
    }

    pub(crate) fn clear(&mut self) {
        self.participants.clear();
        self.pool.clear();
    }

    /// Zero every round score and put everyone back on the wheel.
    pub(crate) fn reset_round(&mut self) {
        for participant in &mut self.participants {
            participant.score = 0;
        }
        self.refill_pool();
    }

    /// Change a player's round score, returning the new score.
    pub(crate) fn adjust_score(&mut self, name: &str, delta: i64) -> Option<i64> {
        let participant = self.participants.iter_mut().find(|participant| participant.name == name)?;
        participant.score = participant.score.saturating_add(delta);
        Some(participant.score)
    }

    /// Take a player off the wheel until the next round reset.
    pub(crate) fn remove_from_pool(&mut self, name: &str) {
        self.pool.retain(|participant| participant.name != name);
    }

    fn refill_pool(&mut self) {
        self.pool = self.participants.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn names(participants: &[Participant]) -> Vec<&str> {
        participants.iter().map(|participant| participant.name.as_str()).collect()
    }

    #[rstest]
    #[case("Alice\nBob\nCarol", &["Alice", "Bob", "Carol"])]
    #[case("  Alice \n\n   \nBob\r\n", &["Alice", "Bob"])]
    #[case("Alice, Bob,,Carol", &["Alice", "Bob", "Carol"])]
    #[case("", &[])]
    #[case(" \n , ", &[])]
    fn parses_names(#[case] input: &str, #[case] expected: &[&str]) {
        assert_eq!(parse_player_names(input), expected);
    }

    #[test]
    fn skips_duplicates_and_assigns_colors() {
        let mut roster = Roster::default();
        let outcome = roster.add(parse_player_names("Alice\nBob\nAlice"));
        assert_eq!(outcome, AddedPlayers { added: 2, duplicates: 1 });
        let outcome = roster.add(parse_player_names("Bob\nCarol"));
        assert_eq!(outcome, AddedPlayers { added: 1, duplicates: 1 });

        assert_eq!(names(roster.participants()), vec!["Alice", "Bob", "Carol"]);
        assert_eq!(roster.participants()[2].color, participant_color(2));
    }

    #[test]
    fn adding_refills_pool() {
        let mut roster = Roster::default();
        roster.add(parse_player_names("Alice\nBob"));
        roster.remove_from_pool("Alice");
        assert_eq!(names(roster.pool()), vec!["Bob"]);
        roster.add(parse_player_names("Carol"));
        assert_eq!(names(roster.pool()), vec!["Alice", "Bob", "Carol"]);
    }

    #[test]
    fn round_reset() {
        let mut roster = Roster::default();
        roster.add(parse_player_names("Alice\nBob"));
        assert_eq!(roster.adjust_score("Alice", 1), Some(1));
        assert_eq!(roster.adjust_score("Alice", 1), Some(2));
        assert_eq!(roster.adjust_score("Nobody", 1), None);
        roster.remove_from_pool("Alice");

        roster.reset_round();
        assert_eq!(roster.get("Alice").map(|p| p.score), Some(0));
        assert_eq!(names(roster.pool()), vec!["Alice", "Bob"]);
        assert_eq!(roster.pool()[0].score, 0);
    }
}
