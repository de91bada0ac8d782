pub(crate) mod roster;

use crate::leaderboard::store::KeyValueStore;
use crate::leaderboard::{Leaderboard, LeaderboardEntry, LeaderboardError};
use crate::wheel::spin::{SpinPlan, SpinSample, SpinSettings, parse_spin_duration};
use crate::wheel::{compute_winner, normalize_angle};
use roster::{AddedPlayers, Roster, parse_player_names};
use std::time::Duration;
use tracing::{debug, info};

/// A decision about the player awaiting one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub(crate) enum Outcome {
    #[strum(to_string = "won")]
    Win,
    #[strum(to_string = "lost")]
    Loss,
}

impl Outcome {
    pub(crate) fn delta(self) -> i64 {
        match self {
            Self::Win => 1,
            Self::Loss => -1,
        }
    }
}

/// Everything that can happen to a game.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Command {
    /// Add players from free text, one per line.
    AddPlayers(String),
    ClearRoster,
    /// Set the spin duration from free text, in seconds.
    SetSpinDuration(String),
    StartSpin,
    /// The running spin moved.
    SpinProgress(SpinSample),
    /// The running spin came to rest at its terminal angle.
    FinishSpin,
    /// The running spin was torn down before finishing.
    CancelSpin,
    RecordOutcome(Outcome),
    ResetRound,
    ResetLeaderboard,
}

/// Why a command was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub(crate) enum Rejection {
    #[strum(to_string = "the wheel is still spinning")]
    Spinning,
    #[strum(to_string = "there is nobody on the wheel")]
    EmptyWheel,
    #[strum(to_string = "no spin is running")]
    NotSpinning,
    #[strum(to_string = "there is no player waiting for a result")]
    NobodyAwaiting,
}

/// What a command did.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Event {
    PlayersAdded(AddedPlayers),
    RosterCleared,
    SpinDurationSet(Duration),
    SpinStarted(SpinPlan),
    WheelMoved,
    SpinFinished { winner: Option<String> },
    SpinCancelled,
    OutcomeRecorded { name: String, outcome: Outcome, round_score: i64, total_score: i64 },
    RoundReset,
    LeaderboardCleared,
    Rejected(Rejection),
}

/// Errors that can occur while running a game
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error(transparent)]
    Leaderboard(#[from] LeaderboardError),
}

/// The observable state of a game.
#[derive(Clone, Debug)]
pub(crate) struct GameState {
    /// The session's players and the ones still on the wheel.
    pub(crate) roster: Roster,
    /// Current wheel rotation in degrees, normalized.
    pub(crate) angle: f64,
    /// The spin in flight, if any.
    pub(crate) active_spin: Option<SpinPlan>,
    /// Time left on the running spin.
    pub(crate) remaining: Duration,
    /// How long the next spin lasts.
    pub(crate) spin_duration: Duration,
    /// The player picked by the latest spin.
    pub(crate) selected: Option<String>,
    /// The player picked by the spin before that, waiting for a win or loss.
    pub(crate) awaiting: Option<String>,
    /// Snapshot of the persisted leaderboard.
    pub(crate) leaderboard: Vec<LeaderboardEntry>,
}

impl GameState {
    pub(crate) fn is_spinning(&self) -> bool {
        self.active_spin.is_some()
    }
}

/// A wheel game: the state plus everything needed to change it.
///
/// All mutation goes through [`Game::dispatch`].
pub(crate) struct Game<S> {
    state: GameState,
    leaderboard: Leaderboard<S>,
    settings: SpinSettings,
    default_duration: Duration,
    rng: fastrand::Rng,
}

impl<S: KeyValueStore> Game<S> {
    pub(crate) fn new(
        leaderboard: Leaderboard<S>,
        settings: SpinSettings,
        default_duration: Duration,
        rng: fastrand::Rng,
    ) -> Self {
        let state = GameState {
            roster: Roster::default(),
            angle: 0.0,
            active_spin: None,
            remaining: Duration::ZERO,
            spin_duration: default_duration,
            selected: None,
            awaiting: None,
            leaderboard: leaderboard.get_all(),
        };
        Self { state, leaderboard, settings, default_duration, rng }
    }

    pub(crate) fn state(&self) -> &GameState {
        &self.state
    }

    /// End the game, handing back the leaderboard it was scoring into.
    pub(crate) fn into_leaderboard(self) -> Leaderboard<S> {
        self.leaderboard
    }

    pub(crate) fn dispatch(&mut self, command: Command) -> Result<Event, GameError> {
        let event = match command {
            Command::AddPlayers(text) => self.add_players(&text),
            Command::ClearRoster => self.clear_roster(),
            Command::SetSpinDuration(text) => {
                self.state.spin_duration = parse_spin_duration(&text, self.default_duration);
                Event::SpinDurationSet(self.state.spin_duration)
            }
            Command::StartSpin => self.start_spin(),
            Command::SpinProgress(sample) => self.spin_progress(sample),
            Command::FinishSpin => self.finish_spin(),
            Command::CancelSpin => self.cancel_spin(),
            Command::RecordOutcome(outcome) => self.record_outcome(outcome)?,
            Command::ResetRound => self.reset_round(),
            Command::ResetLeaderboard => {
                self.leaderboard.reset()?;
                self.state.leaderboard.clear();
                Event::LeaderboardCleared
            }
        };
        Ok(event)
    }

    fn add_players(&mut self, text: &str) -> Event {
        if self.state.is_spinning() {
            return Event::Rejected(Rejection::Spinning);
        }
        let outcome = self.state.roster.add(parse_player_names(text));
        debug!(added = outcome.added, duplicates = outcome.duplicates, "players added");
        Event::PlayersAdded(outcome)
    }

    fn clear_roster(&mut self) -> Event {
        if self.state.is_spinning() {
            return Event::Rejected(Rejection::Spinning);
        }
        self.state.roster.clear();
        self.state.selected = None;
        self.state.awaiting = None;
        Event::RosterCleared
    }

    fn start_spin(&mut self) -> Event {
        if self.state.is_spinning() {
            return Event::Rejected(Rejection::Spinning);
        }
        if self.state.roster.pool().is_empty() {
            return Event::Rejected(Rejection::EmptyWheel);
        }
        let plan = SpinPlan::new(self.state.spin_duration, self.state.angle, &self.settings, &mut self.rng);
        info!(
            frames = plan.frames(),
            rotation = plan.total_rotation(),
            players = self.state.roster.pool().len(),
            "spin started"
        );
        self.state.remaining = plan.duration();
        self.state.active_spin = Some(plan.clone());
        Event::SpinStarted(plan)
    }

    fn spin_progress(&mut self, sample: SpinSample) -> Event {
        if !self.state.is_spinning() {
            return Event::Rejected(Rejection::NotSpinning);
        }
        self.state.angle = normalize_angle(sample.angle);
        self.state.remaining = sample.remaining;
        Event::WheelMoved
    }

    fn finish_spin(&mut self) -> Event {
        let Some(plan) = self.state.active_spin.take() else {
            return Event::Rejected(Rejection::NotSpinning);
        };
        self.state.angle = plan.terminal_angle();
        self.state.remaining = Duration::ZERO;
        let winner = compute_winner(self.state.angle, self.state.roster.pool()).map(|participant| participant.name.clone());
        info!(angle = self.state.angle, winner = winner.as_deref().unwrap_or("-"), "spin finished");
        self.state.awaiting = self.state.selected.take();
        self.state.selected = winner.clone();
        Event::SpinFinished { winner }
    }

    fn cancel_spin(&mut self) -> Event {
        if self.state.active_spin.take().is_none() {
            return Event::Rejected(Rejection::NotSpinning);
        }
        self.state.remaining = Duration::ZERO;
        debug!(angle = self.state.angle, "spin cancelled");
        Event::SpinCancelled
    }

    fn record_outcome(&mut self, outcome: Outcome) -> Result<Event, GameError> {
        let Some(name) = self.state.awaiting.clone() else {
            return Ok(Event::Rejected(Rejection::NobodyAwaiting));
        };
        let delta = outcome.delta();
        // persist first so a failed write leaves the round untouched
        let leaderboard = self.leaderboard.upsert_score(&name, delta)?;
        let total_score =
            leaderboard.iter().find(|entry| entry.name == name).map(|entry| entry.total_score).unwrap_or(delta);
        self.state.leaderboard = leaderboard;

        let round_score = self.state.roster.adjust_score(&name, delta).unwrap_or_default();
        self.state.roster.remove_from_pool(&name);
        self.state.awaiting = None;
        if self.state.selected.as_deref() == Some(name.as_str()) {
            self.state.selected = None;
        }
        info!(name = name.as_str(), %outcome, round_score, total_score, "outcome recorded");
        Ok(Event::OutcomeRecorded { name, outcome, round_score, total_score })
    }

    fn reset_round(&mut self) -> Event {
        if self.state.is_spinning() {
            return Event::Rejected(Rejection::Spinning);
        }
        self.state.roster.reset_round();
        self.state.selected = None;
        self.state.awaiting = None;
        self.state.remaining = Duration::ZERO;
        Event::RoundReset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::store::{MemoryStore, StoreError};

    fn game() -> Game<MemoryStore> {
        Game::new(
            Leaderboard::new(MemoryStore::default()),
            SpinSettings::default(),
            Duration::from_secs(3),
            fastrand::Rng::with_seed(42),
        )
    }

    fn pool(game: &Game<impl KeyValueStore>) -> Vec<String> {
        game.state().roster.pool().iter().map(|participant| participant.name.clone()).collect()
    }

    /// Runs a full spin and returns the winner.
    fn spin<S: KeyValueStore>(game: &mut Game<S>) -> Option<String> {
        let Event::SpinStarted(plan) = game.dispatch(Command::StartSpin).unwrap() else { panic!("spin refused") };
        for sample in plan.samples() {
            assert_eq!(game.dispatch(Command::SpinProgress(sample)).unwrap(), Event::WheelMoved);
        }
        let Event::SpinFinished { winner } = game.dispatch(Command::FinishSpin).unwrap() else { panic!("spin not finished") };
        winner
    }

    #[test]
    fn empty_wheel_refuses_to_spin() {
        let mut game = game();
        assert_eq!(game.dispatch(Command::StartSpin).unwrap(), Event::Rejected(Rejection::EmptyWheel));
        assert!(!game.state().is_spinning());
    }

    #[test]
    fn one_spin_at_a_time() {
        let mut game = game();
        game.dispatch(Command::AddPlayers("Alice\nBob".into())).unwrap();
        assert!(matches!(game.dispatch(Command::StartSpin).unwrap(), Event::SpinStarted(_)));
        assert_eq!(game.dispatch(Command::StartSpin).unwrap(), Event::Rejected(Rejection::Spinning));
        assert_eq!(game.dispatch(Command::AddPlayers("Carol".into())).unwrap(), Event::Rejected(Rejection::Spinning));
        assert_eq!(game.dispatch(Command::ResetRound).unwrap(), Event::Rejected(Rejection::Spinning));
        assert_eq!(game.dispatch(Command::ClearRoster).unwrap(), Event::Rejected(Rejection::Spinning));
    }

    #[test]
    fn winner_matches_terminal_angle() {
        let mut game = game();
        game.dispatch(Command::AddPlayers("Alice\nBob\nCarol\nDave".into())).unwrap();
        let Event::SpinStarted(plan) = game.dispatch(Command::StartSpin).unwrap() else { panic!("spin refused") };
        assert_eq!(game.state().remaining, Duration::from_secs(3));
        let Event::SpinFinished { winner } = game.dispatch(Command::FinishSpin).unwrap() else { panic!("not finished") };

        let expected = compute_winner(plan.terminal_angle(), game.state().roster.pool()).map(|p| p.name.clone());
        assert_eq!(winner, expected);
        assert!(winner.is_some());
        assert_eq!(game.state().angle, plan.terminal_angle());
        assert_eq!(game.state().remaining, Duration::ZERO);
        assert!(!game.state().is_spinning());
    }

    #[test]
    fn next_spin_starts_where_last_one_stopped() {
        let mut game = game();
        game.dispatch(Command::AddPlayers("Alice\nBob".into())).unwrap();
        spin(&mut game);
        let resting = game.state().angle;
        let Event::SpinStarted(plan) = game.dispatch(Command::StartSpin).unwrap() else { panic!("spin refused") };
        assert_eq!(plan.start_angle(), resting);
    }

    #[test]
    fn outcome_applies_to_previous_pick() {
        let mut game = game();
        game.dispatch(Command::AddPlayers("Alice\nBob\nCarol".into())).unwrap();

        let first = spin(&mut game).expect("no winner");
        assert_eq!(game.state().selected.as_deref(), Some(first.as_str()));
        assert_eq!(game.state().awaiting, None);
        assert_eq!(game.dispatch(Command::RecordOutcome(Outcome::Win)).unwrap(), Event::Rejected(Rejection::NobodyAwaiting));

        let second = spin(&mut game).expect("no winner");
        assert_eq!(game.state().awaiting.as_deref(), Some(first.as_str()));
        assert_eq!(game.state().selected.as_deref(), Some(second.as_str()));

        let event = game.dispatch(Command::RecordOutcome(Outcome::Win)).unwrap();
        assert_eq!(
            event,
            Event::OutcomeRecorded { name: first.clone(), outcome: Outcome::Win, round_score: 1, total_score: 1 }
        );
        assert!(!pool(&game).contains(&first));
        assert_eq!(game.state().roster.get(&first).map(|p| p.score), Some(1));
        assert_eq!(game.state().leaderboard, vec![LeaderboardEntry::new(first.clone(), 1)]);
        assert_eq!(game.state().awaiting, None);
        if second == first {
            assert_eq!(game.state().selected, None);
        } else {
            assert_eq!(game.state().selected.as_deref(), Some(second.as_str()));
        }
    }

    #[test]
    fn loss_subtracts_a_point() {
        let mut game = game();
        game.dispatch(Command::AddPlayers("Solo\nDuo".into())).unwrap();
        spin(&mut game);
        let awaiting = spin(&mut game).and(game.state().awaiting.clone()).expect("nobody awaiting");
        let Event::OutcomeRecorded { round_score, total_score, .. } =
            game.dispatch(Command::RecordOutcome(Outcome::Loss)).unwrap()
        else {
            panic!("outcome not recorded")
        };
        assert_eq!((round_score, total_score), (-1, -1));
        assert_eq!(game.state().leaderboard, vec![LeaderboardEntry::new(awaiting, -1)]);
    }

    #[test]
    fn round_reset_restores_everyone() {
        let mut game = game();
        game.dispatch(Command::AddPlayers("Alice\nBob\nCarol".into())).unwrap();
        spin(&mut game);
        spin(&mut game);
        game.dispatch(Command::RecordOutcome(Outcome::Win)).unwrap();
        assert_eq!(pool(&game).len(), 2);

        assert_eq!(game.dispatch(Command::ResetRound).unwrap(), Event::RoundReset);
        assert_eq!(pool(&game), vec!["Alice", "Bob", "Carol"]);
        assert!(game.state().roster.participants().iter().all(|p| p.score == 0));
        assert_eq!(game.state().selected, None);
        assert_eq!(game.state().awaiting, None);
        // the leaderboard outlives the round
        assert_eq!(game.state().leaderboard.len(), 1);
    }

    #[test]
    fn clearing_roster_forgets_picks() {
        let mut game = game();
        game.dispatch(Command::AddPlayers("Alice\nBob".into())).unwrap();
        spin(&mut game);
        assert_eq!(game.dispatch(Command::ClearRoster).unwrap(), Event::RosterCleared);
        assert!(game.state().roster.participants().is_empty());
        assert_eq!(game.state().selected, None);
        assert_eq!(game.dispatch(Command::StartSpin).unwrap(), Event::Rejected(Rejection::EmptyWheel));
    }

    #[test]
    fn cancel_keeps_angle_and_picks_nobody() {
        let mut game = game();
        game.dispatch(Command::AddPlayers("Alice\nBob".into())).unwrap();
        let Event::SpinStarted(plan) = game.dispatch(Command::StartSpin).unwrap() else { panic!("spin refused") };
        let sample = plan.sample(3);
        game.dispatch(Command::SpinProgress(sample)).unwrap();
        assert_eq!(game.dispatch(Command::CancelSpin).unwrap(), Event::SpinCancelled);
        assert_eq!(game.state().angle, sample.angle);
        assert_eq!(game.state().selected, None);
        assert_eq!(game.dispatch(Command::FinishSpin).unwrap(), Event::Rejected(Rejection::NotSpinning));
        assert_eq!(game.dispatch(Command::SpinProgress(sample)).unwrap(), Event::Rejected(Rejection::NotSpinning));
    }

    #[test]
    fn spin_duration_from_text() {
        let mut game = game();
        assert_eq!(
            game.dispatch(Command::SetSpinDuration("7".into())).unwrap(),
            Event::SpinDurationSet(Duration::from_secs(7))
        );
        assert_eq!(
            game.dispatch(Command::SetSpinDuration("soon".into())).unwrap(),
            Event::SpinDurationSet(Duration::from_secs(3))
        );
    }

    #[test]
    fn leaderboard_reset() {
        let mut game = game();
        game.dispatch(Command::AddPlayers("Alice".into())).unwrap();
        spin(&mut game);
        spin(&mut game);
        game.dispatch(Command::RecordOutcome(Outcome::Win)).unwrap();
        assert!(!game.state().leaderboard.is_empty());
        assert_eq!(game.dispatch(Command::ResetLeaderboard).unwrap(), Event::LeaderboardCleared);
        assert!(game.state().leaderboard.is_empty());
        assert_eq!(game.dispatch(Command::ResetLeaderboard).unwrap(), Event::LeaderboardCleared);
    }

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn set(&mut self, key: &str, _: &str) -> Result<(), StoreError> {
            Err(StoreError::InvalidKey(key.to_string()))
        }

        fn remove(&mut self, _: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn failed_write_leaves_round_untouched() {
        let mut game =
            Game::new(Leaderboard::new(ReadOnlyStore), SpinSettings::default(), Duration::from_secs(1), fastrand::Rng::with_seed(1));
        game.dispatch(Command::AddPlayers("Alice\nBob".into())).unwrap();
        spin(&mut game);
        spin(&mut game);
        let awaiting = game.state().awaiting.clone();
        assert!(game.dispatch(Command::RecordOutcome(Outcome::Win)).is_err());
        assert_eq!(game.state().awaiting, awaiting);
        assert_eq!(game.state().roster.pool().len(), 2);
        assert!(game.state().roster.participants().iter().all(|p| p.score == 0));
    }
}
