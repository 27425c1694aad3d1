use crate::display::TerminalStyle;
use crate::opensky::DEFAULT_BASE_URL;
use crate::types::BoundingBox;

const MAX_PAGE_SECONDS: u64 = 24 * 60 * 60;

#[derive(Debug, serde::Deserialize)]
pub struct ApplicationConfig {
    #[serde(default)]
    pub opensky: OpenSkyConfig,
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl ApplicationConfig {
    pub fn construct_from_path(
        path: &std::path::PathBuf,
    ) -> Result<ApplicationConfig, errors::ApplicationConfigError> {
        let string =
            std::fs::read_to_string(path).map_err(|error| errors::ApplicationConfigError::Io {
                source: error,
                path: path.clone(),
            })?;

        let config = ApplicationConfig::construct_from_str(&string).map_err(|error| match error {
            errors::ConfigContentError::Parse(source) => errors::ApplicationConfigError::Parse {
                source,
                path: path.clone(),
            },
            errors::ConfigContentError::Invalid(reason) => {
                errors::ApplicationConfigError::Invalid {
                    reason,
                    path: path.clone(),
                }
            }
        })?;
        Ok(config)
    }

    pub fn construct_from_str(string: &str) -> Result<ApplicationConfig, errors::ConfigContentError> {
        let config: ApplicationConfig =
            toml::from_str(string).map_err(errors::ConfigContentError::Parse)?;
        config.validate().map_err(errors::ConfigContentError::Invalid)?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        self.bounding_box
            .validate()
            .map_err(|e| format!("bounding_box: {e}"))?;
        if self.opensky.timeout_seconds == 0 {
            return Err(String::from("opensky.timeout_seconds must be at least 1"));
        }
        if self.poll.interval_seconds == 0 {
            return Err(String::from("poll.interval_seconds must be at least 1"));
        }
        if self.display.refresh_millis == 0 {
            return Err(String::from("display.refresh_millis must be at least 1"));
        }
        if self.display.page_seconds == 0 {
            return Err(String::from("display.page_seconds must be at least 1"));
        }
        if self.display.page_seconds > MAX_PAGE_SECONDS {
            return Err(format!("display.page_seconds must be at most {MAX_PAGE_SECONDS}"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct OpenSkyConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for OpenSkyConfig {
    fn default() -> Self {
        OpenSkyConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 10,
            username: None,
            password: None,
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_seconds: u64,
    pub max_backoff_ticks: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            interval_seconds: 60,
            max_backoff_ticks: 8,
        }
    }
}

impl PollConfig {
    #[must_use]
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval_seconds)
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub refresh_millis: u64,
    pub page_seconds: u64,
    pub text_color: [u8; 3],
    pub terminal_style: TerminalStyle,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            refresh_millis: 1000,
            page_seconds: 5,
            text_color: [255, 255, 255],
            terminal_style: TerminalStyle::Ansi,
        }
    }
}

impl DisplayConfig {
    #[must_use]
    pub fn refresh_period(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.refresh_millis)
    }

    /// Refresh ticks that make up one page, at least one.
    #[must_use]
    pub fn ticks_per_page(&self) -> u64 {
        self.page_seconds
            .saturating_mul(1000)
            .div_ceil(self.refresh_millis.max(1))
            .max(1)
    }
}

pub mod errors {

    #[derive(Debug)]
    pub enum ApplicationConfigError {
        Parse {
            source: toml::de::Error,
            path: std::path::PathBuf,
        },
        Io {
            source: std::io::Error,
            path: std::path::PathBuf,
        },
        Invalid {
            reason: String,
            path: std::path::PathBuf,
        },
    }
    impl std::fmt::Display for ApplicationConfigError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                ApplicationConfigError::Io {
                    source: error,
                    path,
                } => {
                    write!(
                        f,
                        "Failed to read config file '{}': {}",
                        path.display(),
                        error
                    )
                }
                ApplicationConfigError::Parse {
                    source: error,
                    path,
                } => {
                    write!(
                        f,
                        "Failed to parse config file '{}': {}",
                        path.display(),
                        error
                    )
                }
                ApplicationConfigError::Invalid { reason, path } => {
                    write!(f, "Invalid config file '{}': {}", path.display(), reason)
                }
            }
        }
    }
    impl std::error::Error for ApplicationConfigError {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            match self {
                ApplicationConfigError::Io { source: error, .. } => Some(error),
                ApplicationConfigError::Parse { source: error, .. } => Some(error),
                ApplicationConfigError::Invalid { .. } => None,
            }
        }
    }

    /// Failure to turn config text into a valid configuration, before a path is attached.
    #[derive(Debug)]
    pub enum ConfigContentError {
        Parse(toml::de::Error),
        Invalid(String),
    }
    impl std::fmt::Display for ConfigContentError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                ConfigContentError::Parse(error) => write!(f, "{error}"),
                ConfigContentError::Invalid(reason) => write!(f, "{reason}"),
            }
        }
    }
    impl std::error::Error for ConfigContentError {}
}

#[cfg(test)]
mod tests {
    use super::errors::{ApplicationConfigError, ConfigContentError};
    use super::{ApplicationConfig, DisplayConfig};
    use crate::display::TerminalStyle;

    const MINIMAL: &str = r"
        [bounding_box]
        lat_min = 51.2868
        lat_max = 51.6918
        lon_min = -0.5103
        lon_max = 0.3340
    ";

    #[test]
    fn when_only_bounding_box_is_given_then_defaults_are_filled_in() {
        let config = ApplicationConfig::construct_from_str(MINIMAL).expect("minimal config");

        assert_eq!(config.opensky.base_url, "https://opensky-network.org/api");
        assert_eq!(config.opensky.timeout_seconds, 10);
        assert!(config.opensky.username.is_none());
        assert_eq!(config.poll.interval_seconds, 60);
        assert_eq!(config.poll.max_backoff_ticks, 8);
        assert_eq!(config.display.refresh_millis, 1000);
        assert_eq!(config.display.text_color, [255, 255, 255]);
        assert_eq!(config.display.terminal_style, TerminalStyle::Ansi);
        assert_eq!(config.display.ticks_per_page(), 5);
    }

    #[test]
    fn when_all_sections_are_given_then_values_are_used() {
        let text = format!(
            r#"
            [opensky]
            base_url = "http://localhost:8080/api"
            timeout_seconds = 3
            username = "pi"
            password = "secret"

            [poll]
            interval_seconds = 15
            max_backoff_ticks = 4

            [display]
            refresh_millis = 250
            page_seconds = 2
            text_color = [255, 160, 0]
            terminal_style = "ascii"
            {MINIMAL}"#
        );
        let config = ApplicationConfig::construct_from_str(&text).expect("full config");

        assert_eq!(config.opensky.base_url, "http://localhost:8080/api");
        assert_eq!(config.opensky.username.as_deref(), Some("pi"));
        assert_eq!(config.poll.interval(), std::time::Duration::from_secs(15));
        assert_eq!(config.display.text_color, [255, 160, 0]);
        assert_eq!(config.display.terminal_style, TerminalStyle::Ascii);
        assert_eq!(config.display.ticks_per_page(), 8);
    }

    #[test]
    fn when_parsing_shipped_example_then_it_is_valid() {
        let config =
            ApplicationConfig::construct_from_str(include_str!("../config/skyboard.toml"))
                .expect("example config is valid");
        assert!(config.bounding_box.contains(51.47, -0.45));
    }

    #[test]
    fn when_bounding_box_is_missing_then_parse_fails() {
        let result = ApplicationConfig::construct_from_str("[poll]\ninterval_seconds = 5\n");
        assert!(matches!(result, Err(ConfigContentError::Parse(_))));
    }

    #[test]
    fn when_bounding_box_is_inverted_then_config_is_invalid() {
        let text = MINIMAL.replace("lat_max = 51.6918", "lat_max = 50.0");
        let result = ApplicationConfig::construct_from_str(&text);
        assert!(matches!(result, Err(ConfigContentError::Invalid(reason)) if reason.starts_with("bounding_box")));
    }

    #[test]
    fn when_poll_interval_is_zero_then_config_is_invalid() {
        let text = format!("[poll]\ninterval_seconds = 0\n{MINIMAL}");
        let result = ApplicationConfig::construct_from_str(&text);
        assert!(matches!(result, Err(ConfigContentError::Invalid(_))));
    }

    #[test]
    fn when_page_seconds_is_huge_then_config_is_invalid_and_ticks_do_not_overflow() {
        let text = format!("[display]\npage_seconds = {}\n{MINIMAL}", i64::MAX);
        let result = ApplicationConfig::construct_from_str(&text);
        assert!(matches!(result, Err(ConfigContentError::Invalid(reason)) if reason.starts_with("display.page_seconds")));

        let display = DisplayConfig {
            page_seconds: u64::MAX,
            ..DisplayConfig::default()
        };
        assert_eq!(display.ticks_per_page(), u64::MAX.div_ceil(1000));
    }

    #[test]
    fn when_file_does_not_exist_then_io_error_names_the_path() {
        let path = std::path::PathBuf::from("/nonexistent/skyboard.toml");
        let error = ApplicationConfig::construct_from_path(&path).unwrap_err();

        assert!(matches!(error, ApplicationConfigError::Io { .. }));
        assert!(error.to_string().contains("/nonexistent/skyboard.toml"));
    }
}
