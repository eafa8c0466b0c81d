use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub slack: SlackConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
    /// Table the win records live in. Interpolated into SQL, so it is
    /// validated to a plain identifier.
    pub wins_table: String,
    /// Cadence of the background sweep that removes expired wins.
    pub sweep_interval_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SlackConfig {
    /// Shared static token Slack includes in every inbound request.
    pub verification_token: SecretString,
    /// Bot token used as the bearer credential on outbound calls.
    pub access_token: SecretString,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub wins_table: Option<String>,
    pub log_level: Option<String>,
    pub slack_verification_token: Option<String>,
    pub slack_access_token: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://kudos.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
                wins_table: "wins".to_string(),
                sweep_interval_secs: 300,
            },
            slack: SlackConfig {
                verification_token: String::new().into(),
                access_token: String::new().into(),
            },
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 8080 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("kudos.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
            if let Some(wins_table) = database.wins_table {
                self.database.wins_table = wins_table;
            }
            if let Some(sweep_interval_secs) = database.sweep_interval_secs {
                self.database.sweep_interval_secs = sweep_interval_secs;
            }
        }

        if let Some(slack) = patch.slack {
            if let Some(verification_token_value) = slack.verification_token {
                self.slack.verification_token = secret_value(verification_token_value);
            }
            if let Some(access_token_value) = slack.access_token {
                self.slack.access_token = secret_value(access_token_value);
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("KUDOS_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("KUDOS_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_u32("KUDOS_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("KUDOS_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("KUDOS_DATABASE_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("KUDOS_DATABASE_WINS_TABLE") {
            self.database.wins_table = value;
        }
        if let Some(value) = read_env("KUDOS_DATABASE_SWEEP_INTERVAL_SECS") {
            self.database.sweep_interval_secs =
                parse_u64("KUDOS_DATABASE_SWEEP_INTERVAL_SECS", &value)?;
        }

        if let Some(value) = read_env("KUDOS_SLACK_VERIFICATION_TOKEN") {
            self.slack.verification_token = secret_value(value);
        }
        if let Some(value) = read_env("KUDOS_SLACK_ACCESS_TOKEN") {
            self.slack.access_token = secret_value(value);
        }

        if let Some(value) = read_env("KUDOS_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("KUDOS_SERVER_PORT") {
            self.server.port = parse_u16("KUDOS_SERVER_PORT", &value)?;
        }

        let log_level = read_env("KUDOS_LOGGING_LEVEL").or_else(|| read_env("KUDOS_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format = read_env("KUDOS_LOGGING_FORMAT").or_else(|| read_env("KUDOS_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(wins_table) = overrides.wins_table {
            self.database.wins_table = wins_table;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(verification_token) = overrides.slack_verification_token {
            self.slack.verification_token = secret_value(verification_token);
        }
        if let Some(access_token) = overrides.slack_access_token {
            self.slack.access_token = secret_value(access_token);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_slack(&self.slack)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("kudos.toml"), PathBuf::from("config/kudos.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if !is_plain_identifier(&database.wins_table) {
        return Err(ConfigError::Validation(
            "database.wins_table must be a plain SQL identifier ([A-Za-z_][A-Za-z0-9_]*)"
                .to_string(),
        ));
    }

    if database.sweep_interval_secs == 0 {
        return Err(ConfigError::Validation(
            "database.sweep_interval_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

fn validate_slack(slack: &SlackConfig) -> Result<(), ConfigError> {
    if slack.verification_token.expose_secret().is_empty() {
        return Err(ConfigError::Validation(
            "slack.verification_token is required. Get it from https://api.slack.com/apps > Your App > Basic Information > Verification Token".to_string()
        ));
    }

    let access_token = slack.access_token.expose_secret();
    if access_token.is_empty() {
        return Err(ConfigError::Validation(
            "slack.access_token is required. Get it from https://api.slack.com/apps > Your App > OAuth & Permissions".to_string()
        ));
    }
    if !access_token.starts_with("xoxb-") {
        let hint = if access_token.starts_with("xapp-") {
            " (hint: you may have used the app-level token instead of the bot token)"
        } else {
            ""
        };
        return Err(ConfigError::Validation(format!(
            "slack.access_token must start with `xoxb-`{hint}. Get it from https://api.slack.com/apps"
        )));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    match logging.level.trim().to_ascii_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        other => Err(ConfigError::Validation(format!(
            "logging.level `{other}` is not one of trace|debug|info|warn|error"
        ))),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    slack: Option<SlackPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
    wins_table: Option<String>,
    sweep_interval_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SlackPatch {
    verification_token: Option<String>,
    access_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use secrecy::ExposeSecret;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    fn valid_overrides() -> ConfigOverrides {
        ConfigOverrides {
            database_url: Some("sqlite::memory:".to_string()),
            slack_verification_token: Some("verif-token".to_string()),
            slack_access_token: Some("xoxb-test".to_string()),
            ..ConfigOverrides::default()
        }
    }

    #[test]
    fn load_applies_overrides_and_validates() {
        let config = AppConfig::load(LoadOptions {
            overrides: valid_overrides(),
            ..LoadOptions::default()
        })
        .expect("load");

        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.database.wins_table, "wins");
        assert_eq!(config.slack.access_token.expose_secret(), "xoxb-test");
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn load_rejects_missing_verification_token() {
        let error = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                slack_access_token: Some("xoxb-test".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .expect_err("missing verification token must fail");

        assert!(error.to_string().contains("slack.verification_token"));
    }

    #[test]
    fn load_hints_when_app_token_is_used_as_access_token() {
        let error = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                slack_access_token: Some("xapp-oops".to_string()),
                ..valid_overrides()
            },
            ..LoadOptions::default()
        })
        .expect_err("app token must fail");

        assert!(error.to_string().contains("app-level token"));
    }

    #[test]
    fn load_rejects_non_sqlite_database_url() {
        let error = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("postgres://localhost/kudos".to_string()),
                ..valid_overrides()
            },
            ..LoadOptions::default()
        })
        .expect_err("non-sqlite url must fail");

        assert!(matches!(error, ConfigError::Validation(_)));
    }

    #[test]
    fn load_rejects_unsafe_wins_table_name() {
        let error = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                wins_table: Some("wins; DROP TABLE wins".to_string()),
                ..valid_overrides()
            },
            ..LoadOptions::default()
        })
        .expect_err("unsafe table name must fail");

        assert!(error.to_string().contains("wins_table"));
    }

    #[test]
    fn load_reads_toml_file_with_env_interpolation() {
        std::env::set_var("KUDOS_TEST_INTERPOLATED_TABLE", "team_wins");
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"
[database]
url = "sqlite::memory:"
wins_table = "${{KUDOS_TEST_INTERPOLATED_TABLE}}"

[slack]
verification_token = "verif-token"
access_token = "xoxb-from-file"

[logging]
format = "json"
"#
        )
        .expect("write config");

        let config = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides::default(),
        })
        .expect("load from file");

        assert_eq!(config.database.wins_table, "team_wins");
        assert_eq!(config.slack.access_token.expose_secret(), "xoxb-from-file");
        assert_eq!(config.logging.format, LogFormat::Json);
        std::env::remove_var("KUDOS_TEST_INTERPOLATED_TABLE");
    }

    #[test]
    fn load_fails_when_required_file_is_missing() {
        let error = AppConfig::load(LoadOptions {
            config_path: Some(PathBuf::from("does-not-exist.toml")),
            require_file: true,
            overrides: valid_overrides(),
        })
        .expect_err("missing required file must fail");

        assert!(matches!(error, ConfigError::MissingConfigFile(_)));
    }

    #[test]
    fn log_format_parses_known_values_only() {
        assert_eq!("pretty".parse::<LogFormat>().expect("pretty"), LogFormat::Pretty);
        assert!("yaml".parse::<LogFormat>().is_err());
    }
}
