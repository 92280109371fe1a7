use std::collections::HashMap;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;
pub const DEFAULT_QUEST_LIMIT: i64 = 60;
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

/// Service configuration, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub max_connections: u32,
    /// Most recent quests read per insight map
    pub quest_limit: i64,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&std::env::vars().collect())
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .cloned()
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            port: parse_positive(vars, "PORT", DEFAULT_PORT)?,
            max_connections: parse_positive(
                vars,
                "LUMEN_DB_MAX_CONNECTIONS",
                DEFAULT_MAX_CONNECTIONS,
            )?,
            quest_limit: parse_positive(vars, "LUMEN_QUEST_LIMIT", DEFAULT_QUEST_LIMIT)?,
            cors_origins: split_origins(
                vars.get("LUMEN_CORS_ORIGINS")
                    .map(String::as_str)
                    .unwrap_or(DEFAULT_CORS_ORIGINS),
            ),
        })
    }
}

fn parse_positive<T>(
    vars: &HashMap<String, String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let Some(raw) = vars.get(name) else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(ConfigError::InvalidNumber {
            name,
            value: raw.clone(),
        }),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = AppConfig::from_vars(&vars(&[("DATABASE_URL", "postgres://localhost/lumen")]))
            .unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.quest_limit, DEFAULT_QUEST_LIMIT);
        assert_eq!(config.cors_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    fn database_url_is_required() {
        assert_eq!(
            AppConfig::from_vars(&vars(&[("PORT", "8080")])),
            Err(ConfigError::Missing("DATABASE_URL"))
        );
        assert_eq!(
            AppConfig::from_vars(&vars(&[("DATABASE_URL", "  ")])),
            Err(ConfigError::Missing("DATABASE_URL"))
        );
    }

    #[test]
    fn overrides_are_parsed() {
        let config = AppConfig::from_vars(&vars(&[
            ("DATABASE_URL", "postgres://db/lumen"),
            ("PORT", "8080"),
            ("LUMEN_DB_MAX_CONNECTIONS", "5"),
            ("LUMEN_QUEST_LIMIT", "30"),
            ("LUMEN_CORS_ORIGINS", "https://app.example.com, ,https://admin.example.com"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.quest_limit, 30);
        assert_eq!(
            config.cors_origins,
            vec!["https://app.example.com", "https://admin.example.com"]
        );
    }

    #[test]
    fn rejects_non_positive_numbers() {
        let err = AppConfig::from_vars(&vars(&[
            ("DATABASE_URL", "postgres://db/lumen"),
            ("LUMEN_QUEST_LIMIT", "0"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                name: "LUMEN_QUEST_LIMIT",
                value: "0".to_string()
            }
        );
        assert!(
            AppConfig::from_vars(&vars(&[("DATABASE_URL", "x"), ("PORT", "http")])).is_err()
        );
    }
}
