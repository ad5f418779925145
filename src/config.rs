use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub slack_token: String,
    pub api_base: String,
    /// Minimum spacing between outbound API calls, in seconds.
    pub min_interval_secs: f64,
    /// Maximum attempts for a rate-limited call before degrading.
    pub max_retries: u32,
    pub months: u32,
    pub interval_months: u32,
    pub output_path: String,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingVariable(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVariable(var) => write!(f, "Missing environment variable: {}", var),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let slack_token = env::var("SLACK_TOKEN")
            .map_err(|_| ConfigError::MissingVariable("SLACK_TOKEN".to_string()))?;

        let api_base =
            env::var("SLACK_API_BASE").unwrap_or_else(|_| "https://slack.com/api".to_string());

        let min_interval_secs = env::var("MIN_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5.0);

        let max_retries = env::var("MAX_RETRIES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3);

        let months = env::var("MONTHS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(12);

        let interval_months = env::var("INTERVAL_MONTHS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);

        let output_path =
            env::var("OUTPUT_PATH").unwrap_or_else(|_| "emoji_usage.csv".to_string());

        let settings = Self {
            slack_token,
            api_base,
            min_interval_secs,
            max_retries,
            months,
            interval_months,
            output_path,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slack_token.is_empty() {
            return Err(ConfigError::InvalidValue(
                "SLACK_TOKEN cannot be empty".to_string(),
            ));
        }
        if self.months == 0 {
            return Err(ConfigError::InvalidValue(
                "months must be at least 1".to_string(),
            ));
        }
        if self.interval_months == 0 {
            return Err(ConfigError::InvalidValue(
                "interval_months must be at least 1".to_string(),
            ));
        }
        if self.max_retries == 0 {
            return Err(ConfigError::InvalidValue(
                "max_retries must be at least 1".to_string(),
            ));
        }
        if self.min_interval_secs < 0.0 {
            return Err(ConfigError::InvalidValue(
                "min_interval_secs cannot be negative".to_string(),
            ));
        }
        if self.output_path.is_empty() {
            return Err(ConfigError::InvalidValue(
                "output_path cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_settings() -> Settings {
        Settings {
            slack_token: "xoxp-test".to_string(),
            api_base: "https://slack.com/api".to_string(),
            min_interval_secs: 5.0,
            max_retries: 3,
            months: 12,
            interval_months: 1,
            output_path: "emoji_usage.csv".to_string(),
        }
    }

    #[test]
    fn test_valid_settings() {
        assert!(base_settings().validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut settings = base_settings();
        settings.interval_months = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_months_rejected() {
        let mut settings = base_settings();
        settings.months = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_retry_budget_rejected() {
        // A zero budget would make every call degrade to 0 without ever
        // dispatching, so it must fail before any API traffic.
        let mut settings = base_settings();
        settings.max_retries = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_empty_output_path_rejected() {
        let mut settings = base_settings();
        settings.output_path = String::new();
        assert!(settings.validate().is_err());
    }
}
