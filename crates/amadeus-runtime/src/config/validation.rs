//! Configuration validation utilities.

use super::schema::{AmadeusConfig, BotConfig, LogOutput, LoggingConfig, StateConfig};
use crate::error::{ConfigError, ConfigResult};

/// Validates the entire configuration.
pub fn validate_config(config: &AmadeusConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_bot_config(&config.bot)?;
    validate_state_config(&config.state)?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    // Module filters end up as `EnvFilter` directives.
    for module in logging.filters.keys() {
        if module.is_empty() || module.contains(char::is_whitespace) || module.contains('=') {
            return Err(ConfigError::validation(format!(
                "Invalid log filter target: {module:?}"
            )));
        }
    }

    Ok(())
}

fn validate_bot_config(bot: &BotConfig) -> ConfigResult<()> {
    if bot.name.trim().is_empty() {
        return Err(ConfigError::missing_field("bot.name"));
    }

    if bot.id == 0 {
        return Err(ConfigError::validation("bot.id must be a non-zero user id"));
    }

    if bot.owner_id == Some(bot.id) {
        return Err(ConfigError::validation(
            "bot.owner_id cannot be the bot's own id",
        ));
    }

    Ok(())
}

fn validate_state_config(state: &StateConfig) -> ConfigResult<()> {
    if state.path.as_os_str().is_empty() {
        return Err(ConfigError::missing_field("state.path"));
    }

    if state.path.is_dir() {
        return Err(ConfigError::validation(format!(
            "state.path points to a directory: {}",
            state.path.display()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use std::path::PathBuf;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&AmadeusConfig::default()).is_ok());
    }

    #[test]
    fn test_file_output_needs_path() {
        let mut config = AmadeusConfig::default();
        config.logging.output = LogOutput::File;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { .. })
        ));

        config.logging.file_path = Some(PathBuf::from("amadeus.log"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_filter_target() {
        let mut config = AmadeusConfig::default();
        config
            .logging
            .filters
            .insert("amadeus framework".into(), LogLevel::Debug);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_empty_bot_name() {
        let mut config = AmadeusConfig::default();
        config.bot.name = "  ".into();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { field }) if field == "bot.name"
        ));
    }

    #[test]
    fn test_owner_cannot_be_bot() {
        let mut config = AmadeusConfig::default();
        config.bot.owner_id = Some(config.bot.id);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_state_path_checks() {
        let mut config = AmadeusConfig::default();
        config.state.path = PathBuf::new();
        assert!(validate_config(&config).is_err());

        let dir = tempfile::tempdir().unwrap();
        config.state.path = dir.path().to_path_buf();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }
}
