use super::normalize_angle;
use std::time::{Duration, Instant};

/// Spin length used when the requested duration can't be parsed.
pub(crate) const DEFAULT_SPIN_SECONDS: u64 = 3;

/// Longest spin accepted from user input.
pub(crate) const MAX_SPIN_SECONDS: u64 = 300;

/// Timing knobs for spins.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SpinSettings {
    /// Time between two animation frames.
    pub(crate) frame_interval: Duration,
    /// Base rotation added for every frame of the spin.
    pub(crate) degrees_per_frame: f64,
}

impl Default for SpinSettings {
    fn default() -> Self {
        Self { frame_interval: Duration::from_millis(50), degrees_per_frame: 10.0 }
    }
}

/// Parse a spin duration typed by the user as whole seconds.
///
/// Anything that isn't a non-negative integer falls back to `default`.
pub(crate) fn parse_spin_duration(input: &str, default: Duration) -> Duration {
    match input.trim().parse::<u64>() {
        Ok(seconds) => Duration::from_secs(seconds.min(MAX_SPIN_SECONDS)),
        Err(_) => default,
    }
}

/// The ease-out cubic curve: fast at first, settling towards the end.
pub(crate) fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// A fully determined spin: where it starts, how far it goes and how many frames it takes.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SpinPlan {
    start_angle: f64,
    total_rotation: f64,
    frames: u32,
    frame_interval: Duration,
}

/// One animation frame of a spin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SpinSample {
    /// 1-based frame number.
    pub(crate) frame: u32,
    /// Wheel rotation at this frame, normalized to `[0, 360)`.
    pub(crate) angle: f64,
    /// Time left until the wheel stops.
    pub(crate) remaining: Duration,
}

impl SpinPlan {
    /// Plan a spin with a random landing offset.
    pub(crate) fn new(duration: Duration, start_angle: f64, settings: &SpinSettings, rng: &mut fastrand::Rng) -> Self {
        let offset = rng.f64() * 360.0;
        Self::with_offset(duration, start_angle, settings, offset)
    }

    /// Plan a spin with an explicit landing offset in `[0, 360)`.
    pub(crate) fn with_offset(duration: Duration, start_angle: f64, settings: &SpinSettings, offset: f64) -> Self {
        let interval_millis = settings.frame_interval.as_millis().max(1);
        let frames = u32::try_from(duration.as_millis() / interval_millis).unwrap_or(u32::MAX);
        let total_rotation = frames as f64 * settings.degrees_per_frame + offset;
        Self { start_angle, total_rotation, frames, frame_interval: settings.frame_interval.max(Duration::from_millis(1)) }
    }

    pub(crate) fn frames(&self) -> u32 {
        self.frames
    }

    pub(crate) fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    pub(crate) fn start_angle(&self) -> f64 {
        self.start_angle
    }

    pub(crate) fn total_rotation(&self) -> f64 {
        self.total_rotation
    }

    /// How long the whole spin lasts.
    pub(crate) fn duration(&self) -> Duration {
        self.frame_interval * self.frames
    }

    /// The unnormalized rotation after `frame` frames.
    pub(crate) fn angle_at(&self, frame: u32) -> f64 {
        if self.frames == 0 {
            return self.start_angle + self.total_rotation;
        }
        let progress = frame.min(self.frames) as f64 / self.frames as f64;
        self.start_angle + self.total_rotation * ease_out_cubic(progress)
    }

    pub(crate) fn sample(&self, frame: u32) -> SpinSample {
        let frame = frame.min(self.frames);
        SpinSample {
            frame,
            angle: normalize_angle(self.angle_at(frame)),
            remaining: self.frame_interval * (self.frames - frame),
        }
    }

    /// Every frame of the spin, in order.
    pub(crate) fn samples(&self) -> impl Iterator<Item = SpinSample> + '_ {
        (1..=self.frames).map(|frame| self.sample(frame))
    }

    /// Where the wheel comes to rest. Only this angle decides the winner.
    pub(crate) fn terminal_angle(&self) -> f64 {
        normalize_angle(self.start_angle + self.total_rotation)
    }
}

/// The result of polling a running spin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum SpinPoll {
    /// The wheel moved since the last poll.
    Frame(SpinSample),
    /// No new frame is due yet.
    Pending,
    /// The wheel just stopped at this angle.
    Done { angle: f64 },
    /// The spin already finished or was cancelled.
    Idle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum SpinState {
    Running,
    Finished,
    Cancelled,
}

/// A spin being played out over time.
///
/// Nothing runs in the background: the host loop calls [`SpinAnimation::poll`] whenever it
/// wakes up and renders whatever frame is due. Frames that came due while the host was busy
/// are skipped, only the latest one is reported.
#[derive(Debug)]
pub(crate) struct SpinAnimation {
    plan: SpinPlan,
    started_at: Instant,
    emitted: u32,
    state: SpinState,
}

impl SpinAnimation {
    pub(crate) fn start(plan: SpinPlan, now: Instant) -> Self {
        Self { plan, started_at: now, emitted: 0, state: SpinState::Running }
    }

    pub(crate) fn plan(&self) -> &SpinPlan {
        &self.plan
    }

    pub(crate) fn is_running(&self) -> bool {
        self.state == SpinState::Running
    }

    /// Stop producing frames. A cancelled spin never reports a winner.
    pub(crate) fn cancel(&mut self) {
        if self.state == SpinState::Running {
            self.state = SpinState::Cancelled;
        }
    }

    pub(crate) fn poll(&mut self, now: Instant) -> SpinPoll {
        if self.state != SpinState::Running {
            return SpinPoll::Idle;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        if elapsed >= self.plan.duration() {
            self.state = SpinState::Finished;
            return SpinPoll::Done { angle: self.plan.terminal_angle() };
        }
        let interval = self.plan.frame_interval.as_millis().max(1);
        // frame k is shown from (k - 1) intervals in
        let due = u32::try_from(elapsed.as_millis() / interval + 1).unwrap_or(u32::MAX).min(self.plan.frames);
        if due > self.emitted {
            self.emitted = due;
            SpinPoll::Frame(self.plan.sample(due))
        } else {
            SpinPoll::Pending
        }
    }

    /// When the next poll can produce something new.
    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        if self.state != SpinState::Running {
            return None;
        }
        let next = if self.emitted >= self.plan.frames { self.plan.duration() } else { self.plan.frame_interval * self.emitted };
        Some(self.started_at + next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn settings() -> SpinSettings {
        SpinSettings::default()
    }

    #[rstest]
    #[case("5", 5)]
    #[case(" 2 \n", 2)]
    #[case("0", 0)]
    #[case("", DEFAULT_SPIN_SECONDS)]
    #[case("abc", DEFAULT_SPIN_SECONDS)]
    #[case("-4", DEFAULT_SPIN_SECONDS)]
    #[case("1.5", DEFAULT_SPIN_SECONDS)]
    #[case("100000", MAX_SPIN_SECONDS)]
    fn parses_durations(#[case] input: &str, #[case] seconds: u64) {
        let default = Duration::from_secs(DEFAULT_SPIN_SECONDS);
        assert_eq!(parse_spin_duration(input, default), Duration::from_secs(seconds));
    }

    #[test]
    fn easing_is_monotonic() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        let mut last = 0.0;
        for step in 1..=100 {
            let value = ease_out_cubic(step as f64 / 100.0);
            assert!(value > last);
            last = value;
        }
    }

    #[test]
    fn plan_shape() {
        let plan = SpinPlan::with_offset(Duration::from_secs(3), 30.0, &settings(), 100.0);
        assert_eq!(plan.frames(), 60);
        assert_eq!(plan.total_rotation(), 700.0);
        assert_eq!(plan.duration(), Duration::from_secs(3));
        assert!((plan.terminal_angle() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn samples_end_on_terminal_angle() {
        let plan = SpinPlan::with_offset(Duration::from_secs(2), 350.0, &settings(), 42.5);
        let samples: Vec<_> = plan.samples().collect();
        assert_eq!(samples.len(), 40);
        assert_eq!(samples[0].frame, 1);
        let last = samples.last().unwrap();
        assert!((last.angle - plan.terminal_angle()).abs() < 1e-9);
        assert_eq!(last.remaining, Duration::ZERO);

        let raw: Vec<_> = (1..=plan.frames()).map(|frame| plan.angle_at(frame)).collect();
        assert!(raw.windows(2).all(|pair| pair[1] > pair[0]));
        assert!(samples.iter().all(|sample| (0.0..360.0).contains(&sample.angle)));
    }

    #[test]
    fn random_offset_stays_in_range() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..100 {
            let plan = SpinPlan::new(Duration::from_secs(1), 0.0, &settings(), &mut rng);
            let offset = plan.total_rotation() - 200.0;
            assert!((0.0..360.0).contains(&offset), "{offset}");
        }
    }

    #[test]
    fn zero_length_spin_stops_immediately() {
        let plan = SpinPlan::with_offset(Duration::from_millis(20), 0.0, &settings(), 123.0);
        assert_eq!(plan.frames(), 0);
        assert_eq!(plan.samples().count(), 0);

        let now = Instant::now();
        let mut animation = SpinAnimation::start(plan, now);
        assert_eq!(animation.poll(now), SpinPoll::Done { angle: 123.0 });
        assert_eq!(animation.poll(now), SpinPoll::Idle);
    }

    #[test]
    fn animation_emits_due_frames() {
        let plan = SpinPlan::with_offset(Duration::from_millis(500), 0.0, &settings(), 0.0);
        let start = Instant::now();
        let mut animation = SpinAnimation::start(plan.clone(), start);

        let SpinPoll::Frame(first) = animation.poll(start) else { panic!("expected a frame") };
        assert_eq!(first.frame, 1);
        assert_eq!(animation.poll(start + Duration::from_millis(10)), SpinPoll::Pending);
        assert_eq!(animation.next_deadline(), Some(start + Duration::from_millis(50)));

        // late polls jump to the latest frame
        let SpinPoll::Frame(late) = animation.poll(start + Duration::from_millis(320)) else { panic!("expected a frame") };
        assert_eq!(late, plan.sample(7));

        let done = animation.poll(start + Duration::from_millis(500));
        assert_eq!(done, SpinPoll::Done { angle: plan.terminal_angle() });
        assert!(!animation.is_running());
        assert_eq!(animation.next_deadline(), None);
    }

    #[test]
    fn cancelled_animation_goes_quiet() {
        let plan = SpinPlan::with_offset(Duration::from_secs(1), 0.0, &settings(), 10.0);
        let start = Instant::now();
        let mut animation = SpinAnimation::start(plan, start);
        assert!(matches!(animation.poll(start), SpinPoll::Frame(_)));
        animation.cancel();
        assert!(!animation.is_running());
        assert_eq!(animation.poll(start + Duration::from_secs(5)), SpinPoll::Idle);
    }
}
