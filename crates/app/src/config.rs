use std::path::PathBuf;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use mira_assistant::DEFAULT_REPLY_DELAY_MS;
use mira_auth::DEFAULT_AUTH_DELAY_MS;

/// Config file location relative to the user's home directory.
pub const DEFAULT_CONFIG_RELATIVE_PATH: &str = ".mira/config.toml";

/// Prefix for environment variable overrides (e.g. `MIRA_REPLY_DELAY_MS`).
pub const ENV_PREFIX: &str = "MIRA_";

/// Application settings, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Delay before a simulated reply completes, in milliseconds.
    pub reply_delay_ms: u64,
    /// Delay before the stub auth gate resolves, in milliseconds.
    pub auth_delay_ms: u64,
    /// Capability flag for voice input. Injected through configuration;
    /// nothing in the application inspects the host environment to decide.
    pub voice_input_enabled: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            reply_delay_ms: DEFAULT_REPLY_DELAY_MS,
            auth_delay_ms: DEFAULT_AUTH_DELAY_MS,
            voice_input_enabled: false,
        }
    }
}

impl AppSettings {
    /// Loads settings from the default config path and `MIRA_*` variables.
    pub fn load() -> Self {
        Self::load_from(default_config_path())
    }

    /// Loads settings layered defaults -> config file -> environment.
    /// A malformed source logs a warning and falls back to defaults;
    /// configuration is never fatal.
    pub fn load_from(path: PathBuf) -> Self {
        let figment = Figment::from(Serialized::defaults(AppSettings::default()))
            .merge(Toml::file(&path))
            .merge(Env::prefixed(ENV_PREFIX));

        match figment.extract() {
            Ok(settings) => settings,
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %error,
                    "failed to load settings; using defaults"
                );
                AppSettings::default()
            }
        }
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    pub fn auth_delay(&self) -> Duration {
        Duration::from_millis(self.auth_delay_ms)
    }
}

/// Returns the config file path in the user's home directory, falling back
/// to a working-directory dotfile when no home is available.
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_CONFIG_RELATIVE_PATH))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_RELATIVE_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_any_configuration_source() {
        figment::Jail::expect_with(|_jail| {
            let settings = AppSettings::load_from(PathBuf::from("config.toml"));
            assert_eq!(settings, AppSettings::default());
            assert_eq!(settings.reply_delay(), Duration::from_millis(1_500));
            assert_eq!(settings.auth_delay(), Duration::from_millis(1_500));
            assert!(!settings.voice_input_enabled);
            Ok(())
        });
    }

    #[test]
    fn config_file_and_environment_override_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "reply_delay_ms = 250")?;
            jail.set_env("MIRA_VOICE_INPUT_ENABLED", "true");

            let settings = AppSettings::load_from(PathBuf::from("config.toml"));
            assert_eq!(settings.reply_delay_ms, 250);
            assert_eq!(settings.auth_delay_ms, DEFAULT_AUTH_DELAY_MS);
            assert!(settings.voice_input_enabled);
            Ok(())
        });
    }

    #[test]
    fn malformed_configuration_falls_back_to_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "reply_delay_ms = \"soon\"")?;

            let settings = AppSettings::load_from(PathBuf::from("config.toml"));
            assert_eq!(settings, AppSettings::default());
            Ok(())
        });
    }
}
