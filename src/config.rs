use crate::ui::animations::CelebrationStyle;
use crate::wheel::spin::{DEFAULT_SPIN_SECONDS, MAX_SPIN_SECONDS, SpinSettings};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fs, io};

/// The application's directories, resolved from the platform conventions.
pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "spinwheel")
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) spin: SpinConfig,

    #[serde(default)]
    pub(crate) leaderboard: LeaderboardConfig,

    #[serde(default)]
    pub(crate) logging: LoggingConfig,

    #[serde(default)]
    pub(crate) celebration: CelebrationConfig,
}

impl Config {
    /// Load the config from a path.
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ConfigLoadError::NotFound),
            Err(e) => return Err(e.into()),
        };
        Self::parse(&contents)
    }

    pub(crate) fn parse(contents: &str) -> Result<Self, ConfigLoadError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.spin.default_duration_seconds > MAX_SPIN_SECONDS {
            return Err(ConfigLoadError::Invalid(format!(
                "spin.default_duration_seconds must be at most {MAX_SPIN_SECONDS}"
            )));
        }
        if self.spin.frame_interval_millis == 0 {
            return Err(ConfigLoadError::Invalid("spin.frame_interval_millis must be greater than zero".into()));
        }
        if !self.spin.degrees_per_frame.is_finite() || self.spin.degrees_per_frame < 0.0 {
            return Err(ConfigLoadError::Invalid("spin.degrees_per_frame must be a non-negative number".into()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("config file not found")]
    NotFound,

    #[error("invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SpinConfig {
    /// The spin duration used when none, or an invalid one, is given.
    #[serde(default = "default_spin_seconds")]
    pub(crate) default_duration_seconds: u64,

    /// The time between animation frames.
    #[serde(default = "default_frame_interval_millis")]
    pub(crate) frame_interval_millis: u64,

    /// The base rotation added for every animation frame.
    #[serde(default = "default_degrees_per_frame")]
    pub(crate) degrees_per_frame: f64,
}

impl SpinConfig {
    pub(crate) fn default_duration(&self) -> Duration {
        Duration::from_secs(self.default_duration_seconds.min(MAX_SPIN_SECONDS))
    }

    pub(crate) fn settings(&self) -> SpinSettings {
        SpinSettings {
            frame_interval: Duration::from_millis(self.frame_interval_millis.max(1)),
            degrees_per_frame: self.degrees_per_frame,
        }
    }
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            default_duration_seconds: default_spin_seconds(),
            frame_interval_millis: default_frame_interval_millis(),
            degrees_per_frame: default_degrees_per_frame(),
        }
    }
}

fn default_spin_seconds() -> u64 {
    DEFAULT_SPIN_SECONDS
}

fn default_frame_interval_millis() -> u64 {
    50
}

fn default_degrees_per_frame() -> f64 {
    10.0
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct LeaderboardConfig {
    /// The directory the leaderboard is stored in. Defaults to the platform data directory.
    #[serde(default)]
    pub(crate) directory: Option<PathBuf>,

    /// How many entries to show.
    #[serde(default = "default_display_limit")]
    pub(crate) display_limit: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self { directory: None, display_limit: default_display_limit() }
    }
}

fn default_display_limit() -> usize {
    10
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct LoggingConfig {
    /// The log filter used when `RUST_LOG` isn't set.
    #[serde(default = "default_log_level")]
    pub(crate) level: String,

    /// The file interactive sessions log into. Defaults to `spinwheel.log` in the data directory.
    #[serde(default)]
    pub(crate) path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), path: None }
    }
}

fn default_log_level() -> String {
    "info".into()
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CelebrationConfig {
    /// The animation used on the winner banner.
    #[serde(default)]
    pub(crate) style: CelebrationStyle,

    /// How long the winner banner animates for.
    #[serde(default = "default_celebration_millis")]
    pub(crate) duration_millis: u64,
}

impl Default for CelebrationConfig {
    fn default() -> Self {
        Self { style: CelebrationStyle::default(), duration_millis: default_celebration_millis() }
    }
}

fn default_celebration_millis() -> u64 {
    2000
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[test]
    fn empty_config_is_default() {
        let config = Config::parse("").expect("parse failed");
        assert_eq!(config.spin.default_duration(), Duration::from_secs(3));
        assert_eq!(config.spin.settings(), SpinSettings::default());
        assert_eq!(config.leaderboard.display_limit, 10);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.celebration.style, CelebrationStyle::Rainbow);
    }

    #[test]
    fn partial_config() {
        let contents = r#"
spin:
  default_duration_seconds: 5
leaderboard:
  directory: /tmp/wheel
celebration:
  style: neon
"#;
        let config = Config::parse(contents).expect("parse failed");
        assert_eq!(config.spin.default_duration(), Duration::from_secs(5));
        assert_eq!(config.spin.frame_interval_millis, 50);
        assert_eq!(config.leaderboard.directory, Some(PathBuf::from("/tmp/wheel")));
        assert_eq!(config.celebration.style, CelebrationStyle::Neon);
        assert_eq!(config.celebration.duration_millis, 2000);
    }

    #[rstest]
    #[case("spinn: {}")]
    #[case("spin:\n  frame_interval_millis: 0")]
    #[case("spin:\n  default_duration_seconds: 301")]
    #[case("spin:\n  degrees_per_frame: -1")]
    #[case("celebration:\n  style: disco")]
    fn rejects_bad_config(#[case] contents: &str) {
        assert!(Config::parse(contents).is_err());
    }

    #[test]
    fn default_duration_is_capped() {
        let spin = SpinConfig { default_duration_seconds: 10_000, ..SpinConfig::default() };
        assert_eq!(spin.default_duration(), Duration::from_secs(MAX_SPIN_SECONDS));
        let config = Config::parse("spin:\n  default_duration_seconds: 300").expect("parse failed");
        assert_eq!(config.spin.default_duration(), Duration::from_secs(300));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("no temp file");
        writeln!(file, "logging:\n  level: debug").unwrap();
        let config = Config::load(file.path()).expect("load failed");
        assert_eq!(config.logging.level, "debug");

        let missing = file.path().with_extension("missing");
        assert!(matches!(Config::load(&missing), Err(ConfigLoadError::NotFound)));
    }
}
