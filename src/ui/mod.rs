pub(crate) mod animations;
pub(crate) mod banner;
mod input;
mod terminal;
pub(crate) mod wheel_view;

use crate::game::{Command, Event, Game, GameError, GameState, Outcome};
use crate::leaderboard::store::KeyValueStore;
use crate::wheel::palette::Rgb;
use crate::wheel::spin::{SpinAnimation, SpinPoll};
use animations::CelebrationStyle;
use anyhow::Context;
use banner::{BannerGenerator, WinnerBanner};
use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event as TerminalEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::queue;
use crossterm::style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use input::{InputAction, LineInput};
use itertools::Itertools;
use std::io::{self, Write};
use std::time::{Duration, Instant};
use terminal::TerminalGuard;
use tracing::{debug, warn};
use wheel_view::{WheelView, truncate};

const GOLD: Rgb = Rgb::new(0xFF, 0xD7, 0x00);
const SILVER: Rgb = Rgb::new(0xC0, 0xC0, 0xC0);
const BRONZE: Rgb = Rgb::new(0xCD, 0x7F, 0x32);
const DIM: Rgb = Rgb::new(0x70, 0x70, 0x70);
const COUNTDOWN: Rgb = Rgb::new(0x40, 0x80, 0xFF);
const COUNTDOWN_LOW: Rgb = Rgb::new(0xFF, 0x40, 0x40);

const SIDE_COLUMN_WIDTH: u16 = 26;
const IDLE_POLL: Duration = Duration::from_millis(500);
const BANNER_FRAME: Duration = Duration::from_millis(50);

const HELP: &str = "[space] spin  [w] won  [l] lost  [a] add players  [d] duration  [r] new round  [c] clear players  [x] clear leaderboard  [q] quit";

/// Presentation settings for the terminal front end.
#[derive(Clone, Debug)]
pub(crate) struct UiOptions {
    /// How many leaderboard entries to show.
    pub(crate) leaderboard_limit: usize,
    /// The winner banner animation.
    pub(crate) celebration: CelebrationStyle,
    /// How long the winner banner animates.
    pub(crate) celebration_duration: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Normal,
    AddingPlayers,
    EditingDuration,
    ConfirmLeaderboardReset,
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// The interactive game.
pub(crate) struct App<S> {
    game: Game<S>,
    spin: Option<SpinAnimation>,
    mode: Mode,
    input: LineInput,
    status: String,
    banner: Option<WinnerBanner>,
    banner_generator: Option<BannerGenerator>,
    options: UiOptions,
}

impl<S: KeyValueStore> App<S> {
    pub(crate) fn new(game: Game<S>, options: UiOptions) -> Self {
        let banner_generator = match BannerGenerator::new() {
            Ok(generator) => Some(generator),
            Err(e) => {
                warn!(error = %e, "winner banner disabled");
                None
            }
        };
        Self {
            game,
            spin: None,
            mode: Mode::Normal,
            input: LineInput::default(),
            status: "Press [a] to add players".into(),
            banner: None,
            banner_generator,
            options,
        }
    }

    /// Take over the terminal and play until the user quits.
    pub(crate) fn run(mut self) -> anyhow::Result<()> {
        let mut terminal = TerminalGuard::enter().context("failed to set up the terminal")?;
        let result = self.event_loop(terminal.stdout());
        self.cancel_spin();
        result
    }

    fn event_loop<W: Write>(&mut self, output: &mut W) -> anyhow::Result<()> {
        loop {
            let now = Instant::now();
            self.tick(now)?;
            let size = crossterm::terminal::size().unwrap_or((80, 24));
            self.draw(output, now, size)?;

            if !event::poll(self.poll_timeout(Instant::now()))? {
                continue;
            }
            if let TerminalEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && self.handle_key(key, Instant::now()) == Flow::Quit {
                    return Ok(());
                }
            }
        }
    }

    /// How long the loop can sleep waiting for input.
    fn poll_timeout(&self, now: Instant) -> Duration {
        if let Some(deadline) = self.spin.as_ref().and_then(SpinAnimation::next_deadline) {
            return deadline.saturating_duration_since(now);
        }
        match &self.banner {
            Some(banner) if banner.is_animating(now) => BANNER_FRAME,
            _ => IDLE_POLL,
        }
    }

    /// Advance the running spin, if any.
    fn tick(&mut self, now: Instant) -> Result<(), GameError> {
        let Some(spin) = self.spin.as_mut() else {
            return Ok(());
        };
        match spin.poll(now) {
            SpinPoll::Frame(sample) => {
                self.game.dispatch(Command::SpinProgress(sample))?;
            }
            SpinPoll::Done { angle } => {
                debug!(angle, "wheel stopped");
                self.spin = None;
                let event = self.game.dispatch(Command::FinishSpin)?;
                self.on_event(event, now);
            }
            SpinPoll::Pending => {}
            SpinPoll::Idle => self.spin = None,
        }
        Ok(())
    }

    fn cancel_spin(&mut self) {
        if let Some(mut spin) = self.spin.take() {
            spin.cancel();
            if let Err(e) = self.game.dispatch(Command::CancelSpin) {
                warn!(error = %e, "failed to cancel spin");
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }
        match self.mode {
            Mode::Normal => return self.handle_normal_key(key, now),
            Mode::AddingPlayers | Mode::EditingDuration => {
                let command = match self.input.handle(key) {
                    InputAction::Submit(text) if self.mode == Mode::AddingPlayers => Some(Command::AddPlayers(text)),
                    InputAction::Submit(text) => Some(Command::SetSpinDuration(text)),
                    InputAction::Cancel => {
                        self.status = "Cancelled".into();
                        self.mode = Mode::Normal;
                        None
                    }
                    InputAction::Edited | InputAction::Ignored => None,
                };
                if let Some(command) = command {
                    self.mode = Mode::Normal;
                    self.apply(command, now);
                }
            }
            Mode::ConfirmLeaderboardReset => {
                self.mode = Mode::Normal;
                if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                    self.apply(Command::ResetLeaderboard, now);
                } else {
                    self.status = "Leaderboard kept".into();
                }
            }
        }
        Flow::Continue
    }

    fn handle_normal_key(&mut self, key: KeyEvent, now: Instant) -> Flow {
        let command = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
            KeyCode::Char(' ') | KeyCode::Char('s') | KeyCode::Enter => Command::StartSpin,
            KeyCode::Char('w') => Command::RecordOutcome(Outcome::Win),
            KeyCode::Char('l') => Command::RecordOutcome(Outcome::Loss),
            KeyCode::Char('r') => Command::ResetRound,
            KeyCode::Char('c') => Command::ClearRoster,
            KeyCode::Char('a') => {
                self.mode = Mode::AddingPlayers;
                self.status = "Type names separated by commas, then press enter".into();
                return Flow::Continue;
            }
            KeyCode::Char('d') => {
                self.mode = Mode::EditingDuration;
                self.status = "Spin duration in seconds".into();
                return Flow::Continue;
            }
            KeyCode::Char('x') => {
                self.mode = Mode::ConfirmLeaderboardReset;
                self.status = "Clear the leaderboard for good? [y/N]".into();
                return Flow::Continue;
            }
            _ => return Flow::Continue,
        };
        self.apply(command, now);
        Flow::Continue
    }

    fn apply(&mut self, command: Command, now: Instant) {
        match self.game.dispatch(command) {
            Ok(event) => self.on_event(event, now),
            Err(e) => {
                warn!(error = %e, "command failed");
                self.status = format!("Error: {e}");
            }
        }
    }

    fn on_event(&mut self, event: Event, now: Instant) {
        self.status = match event {
            Event::PlayersAdded(added) if added.duplicates > 0 => {
                format!("Added {} player(s), skipped {} already playing", added.added, added.duplicates)
            }
            Event::PlayersAdded(added) => format!("Added {} player(s)", added.added),
            Event::RosterCleared => {
                self.banner = None;
                "Player list cleared".into()
            }
            Event::SpinDurationSet(duration) => format!("Spins now last {}s", duration.as_secs()),
            Event::SpinStarted(plan) => {
                self.banner = None;
                self.spin = Some(SpinAnimation::start(plan, now));
                "Spinning...".into()
            }
            Event::WheelMoved => return,
            Event::SpinFinished { winner: Some(winner) } => {
                self.banner = Some(WinnerBanner::new(
                    &winner,
                    self.banner_generator.as_ref(),
                    self.options.celebration,
                    self.options.celebration_duration,
                    now,
                ));
                format!("The wheel picked {winner}")
            }
            Event::SpinFinished { winner: None } => "The wheel stopped on nobody".into(),
            Event::SpinCancelled => "Spin cancelled".into(),
            Event::OutcomeRecorded { name, outcome, total_score, .. } => {
                format!("{name} {outcome}, {total_score} point(s) overall")
            }
            Event::RoundReset => {
                self.banner = None;
                "New round: everyone is back on the wheel".into()
            }
            Event::LeaderboardCleared => "Leaderboard cleared".into(),
            Event::Rejected(rejection) => format!("Can't do that: {rejection}"),
        };
    }

    fn draw<W: Write>(&self, output: &mut W, now: Instant, (columns, rows): (u16, u16)) -> io::Result<()> {
        queue!(output, Clear(ClearType::All))?;
        let state = self.game.state();

        queue!(output, MoveTo(1, 0), SetAttribute(Attribute::Bold), Print("WHEEL OF FORTUNE"), SetAttribute(Attribute::Reset))?;
        let duration = format!("spin: {}s", state.spin_duration.as_secs());
        print_at(output, columns.saturating_sub(duration.len() as u16 + 1), 0, &duration, Some(DIM))?;

        self.draw_players(output, state, rows)?;
        self.draw_leaderboard(output, state, columns, rows)?;

        let center_left = SIDE_COLUMN_WIDTH + 1;
        let center_width = columns.saturating_sub(SIDE_COLUMN_WIDTH * 2 + 2);
        let wheel_bottom = self.draw_wheel(output, state, center_left, center_width, rows)?;
        self.draw_turn(output, state, now, center_left, center_width, wheel_bottom, rows)?;

        let footer = rows.saturating_sub(1);
        print_at(output, 1, footer.saturating_sub(1), &self.status, None)?;
        match self.mode {
            Mode::AddingPlayers => print_at(output, 1, footer, &format!("Players: {}▏", self.input.text()), None)?,
            Mode::EditingDuration => print_at(output, 1, footer, &format!("Seconds: {}▏", self.input.text()), None)?,
            Mode::Normal | Mode::ConfirmLeaderboardReset => {
                print_at(output, 1, footer, &truncate(HELP, columns.saturating_sub(2) as usize), Some(DIM))?
            }
        }
        output.flush()
    }

    fn draw_players<W: Write>(&self, output: &mut W, state: &GameState, rows: u16) -> io::Result<()> {
        print_at(output, 1, 2, "Players", None)?;
        let participants = state.roster.participants();
        if participants.is_empty() {
            return print_at(output, 1, 4, "Nobody yet", Some(DIM));
        }
        let pool = state.roster.pool();
        let name_width = SIDE_COLUMN_WIDTH as usize - 9;
        let visible = rows.saturating_sub(7) as usize;
        for (offset, participant) in participants.iter().take(visible).enumerate() {
            let row = 4 + offset as u16;
            let on_wheel = pool.iter().any(|p| p.name == participant.name);
            print_at(output, 1, row, "●", Some(participant.color))?;
            let name = format!("{:<width$}", truncate(&participant.name, name_width), width = name_width);
            print_at(output, 3, row, &name, if on_wheel { None } else { Some(DIM) })?;
            print_at(output, 4 + name_width as u16, row, &format!("{:>4}", participant.score), None)?;
        }
        if participants.len() > visible {
            let hidden = participants.len() - visible;
            print_at(output, 1, 4 + visible as u16, &format!("... and {hidden} more"), Some(DIM))?;
        }
        Ok(())
    }

    fn draw_leaderboard<W: Write>(&self, output: &mut W, state: &GameState, columns: u16, rows: u16) -> io::Result<()> {
        let left = columns.saturating_sub(SIDE_COLUMN_WIDTH);
        print_at(output, left, 2, "Leaderboard", None)?;
        if state.leaderboard.is_empty() {
            print_at(output, left, 4, "No results yet.", Some(DIM))?;
            return print_at(output, left, 5, "Play the first game!", Some(DIM));
        }
        let limit = self.options.leaderboard_limit.min(rows.saturating_sub(7) as usize);
        let name_width = SIDE_COLUMN_WIDTH as usize - 10;
        for (index, entry) in state.leaderboard.iter().take(limit).enumerate() {
            let color = match index {
                0 => Some(GOLD),
                1 => Some(SILVER),
                2 => Some(BRONZE),
                _ => None,
            };
            let line = format!(
                "{:>2}. {:<width$} {:>4}",
                index + 1,
                truncate(&entry.name, name_width),
                entry.total_score,
                width = name_width
            );
            print_at(output, left, 4 + index as u16, &line, color)?;
        }
        Ok(())
    }

    /// Draws the wheel and returns the first row below it.
    fn draw_wheel<W: Write>(
        &self,
        output: &mut W,
        state: &GameState,
        left: u16,
        width: u16,
        rows: u16,
    ) -> io::Result<u16> {
        // leave room for the turn info and the banner below the wheel
        let by_height = rows.saturating_sub(16) / 2;
        let by_width = width.saturating_sub(1) / 4;
        let radius = by_height.min(by_width).max(2);
        let view = WheelView::render(state.roster.pool(), state.angle, radius);
        let offset = left + width.saturating_sub(view.width() as u16) / 2;
        let top = 2;
        for (index, cells) in view.rows().iter().enumerate() {
            let row = top + index as u16;
            if row >= rows {
                break;
            }
            queue!(output, MoveTo(offset, row))?;
            for (bg, group) in &cells.iter().chunk_by(|cell| cell.bg) {
                if let Some(bg) = bg {
                    queue!(output, SetBackgroundColor(bg.into()))?;
                }
                for cell in group {
                    match cell.fg {
                        Some(fg) => queue!(output, SetForegroundColor(fg.into()), Print(cell.ch))?,
                        None => queue!(output, Print(cell.ch))?,
                    }
                }
                queue!(output, ResetColor)?;
            }
        }
        Ok(top + view.rows().len() as u16 + 1)
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_turn<W: Write>(
        &self,
        output: &mut W,
        state: &GameState,
        now: Instant,
        left: u16,
        width: u16,
        top: u16,
        rows: u16,
    ) -> io::Result<()> {
        let color_of = |name: &str| state.roster.get(name).map(|participant| participant.color);
        let (line, color) = if state.roster.pool().is_empty() {
            ("Add players to start the game!".to_string(), Some(DIM))
        } else if let Some(name) = &state.awaiting {
            (format!("Player to score: {name}"), color_of(name.as_str()))
        } else if let Some(name) = &state.selected {
            (format!("Current player: {name}"), color_of(name.as_str()))
        } else {
            ("Spin the wheel!".to_string(), None)
        };
        print_centered(output, left, width, top, &line, color)?;

        if state.is_spinning() {
            let seconds = state.remaining.as_secs_f32().ceil() as u64;
            let color = if state.remaining > Duration::from_secs(1) { COUNTDOWN } else { COUNTDOWN_LOW };
            print_centered(output, left, width, top + 1, &format!("Time left: {seconds}s"), Some(color))?;
        } else if !state.roster.pool().is_empty() {
            print_centered(output, left, width, top + 1, "Wheel stopped", Some(DIM))?;
        }

        let Some(banner) = &self.banner else {
            return Ok(());
        };
        let banner_top = top + 3;
        let fits = banner.width() <= width as usize && banner_top as usize + banner.height() < rows as usize;
        if !fits {
            return print_centered(output, left, width, banner_top, banner.name(), None);
        }
        let offset = left + (width - banner.width() as u16) / 2;
        for (index, cells) in banner.render(now).iter().enumerate() {
            queue!(output, MoveTo(offset, banner_top + index as u16))?;
            for (ch, color) in cells {
                match color {
                    Some(color) => queue!(output, SetForegroundColor((*color).into()), Print(ch))?,
                    None => queue!(output, Print(ch))?,
                }
            }
            queue!(output, ResetColor)?;
        }
        Ok(())
    }
}

fn print_at<W: Write>(output: &mut W, column: u16, row: u16, text: &str, color: Option<Rgb>) -> io::Result<()> {
    queue!(output, MoveTo(column, row))?;
    match color {
        Some(color) => queue!(output, SetForegroundColor(color.into()), Print(text), ResetColor),
        None => queue!(output, Print(text)),
    }
}

fn print_centered<W: Write>(
    output: &mut W,
    left: u16,
    width: u16,
    row: u16,
    text: &str,
    color: Option<Rgb>,
) -> io::Result<()> {
    let text = truncate(text, width as usize);
    let length = text.chars().count() as u16;
    print_at(output, left + width.saturating_sub(length) / 2, row, &text, color)
}
