//! Runtime configuration read from `CUSTODY_*` environment variables.

use chrono::NaiveTime;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

use crate::date_util::MAX_HORIZON_MONTHS;
use crate::event;
use crate::export::DEFAULT_DOMAIN;
use crate::extender::DEFAULT_CONTINUE_MONTHS;
use crate::generator::{
    DEFAULT_CHILD_NAME, DEFAULT_INITIAL_MONTHS, ScheduleGenerator, default_handoff_time,
};

pub const ENV_STORE: &str = "CUSTODY_STORE";
pub const ENV_HTTP_ADDR: &str = "CUSTODY_HTTP_ADDR";
pub const ENV_INITIAL_MONTHS: &str = "CUSTODY_INITIAL_MONTHS";
pub const ENV_CONTINUE_MONTHS: &str = "CUSTODY_CONTINUE_MONTHS";
pub const ENV_CHILD_NAME: &str = "CUSTODY_CHILD_NAME";
pub const ENV_HANDOFF_TIME: &str = "CUSTODY_HANDOFF_TIME";
pub const ENV_EXPORT_DOMAIN: &str = "CUSTODY_EXPORT_DOMAIN";

const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid value '{value}' for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Json,
    Sqlite,
}

impl StoreKind {
    /// `.db`, `.sqlite` and `.sqlite3` files use SQLite, anything else JSON.
    pub fn for_path(path: &std::path::Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("db" | "sqlite" | "sqlite3") => StoreKind::Sqlite,
            _ => StoreKind::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub store_path: Option<PathBuf>,
    pub http_addr: SocketAddr,
    pub initial_months: u32,
    pub continue_months: u32,
    pub child_name: String,
    pub handoff_time: NaiveTime,
    pub export_domain: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let http_addr = get(ENV_HTTP_ADDR).unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string());
        let http_addr: SocketAddr = http_addr.parse().map_err(|_| ConfigError {
            key: ENV_HTTP_ADDR,
            value: http_addr.clone(),
            reason: "expected host:port",
        })?;

        let handoff_time = match get(ENV_HANDOFF_TIME) {
            Some(raw) => event::parse_time(&raw).ok_or(ConfigError {
                key: ENV_HANDOFF_TIME,
                value: raw,
                reason: "expected HH:MM",
            })?,
            None => default_handoff_time(),
        };

        Ok(Self {
            store_path: get(ENV_STORE).map(PathBuf::from),
            http_addr,
            initial_months: parse_months(ENV_INITIAL_MONTHS, get(ENV_INITIAL_MONTHS))?
                .unwrap_or(DEFAULT_INITIAL_MONTHS),
            continue_months: parse_months(ENV_CONTINUE_MONTHS, get(ENV_CONTINUE_MONTHS))?
                .unwrap_or(DEFAULT_CONTINUE_MONTHS),
            child_name: get(ENV_CHILD_NAME).unwrap_or_else(|| DEFAULT_CHILD_NAME.to_string()),
            handoff_time,
            export_domain: get(ENV_EXPORT_DOMAIN).unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
        })
    }

    pub fn store_kind(&self) -> Option<StoreKind> {
        self.store_path.as_deref().map(StoreKind::for_path)
    }

    pub fn generator(&self) -> ScheduleGenerator {
        ScheduleGenerator::new(self.initial_months)
            .with_child_name(self.child_name.clone())
            .with_handoff_time(self.handoff_time)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            http_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            initial_months: DEFAULT_INITIAL_MONTHS,
            continue_months: DEFAULT_CONTINUE_MONTHS,
            child_name: DEFAULT_CHILD_NAME.to_string(),
            handoff_time: default_handoff_time(),
            export_domain: DEFAULT_DOMAIN.to_string(),
        }
    }
}

fn parse_months(key: &'static str, raw: Option<String>) -> Result<Option<u32>, ConfigError> {
    match raw {
        None => Ok(None),
        Some(raw) => match raw.parse::<u32>() {
            Ok(months) if (1..=MAX_HORIZON_MONTHS).contains(&months) => Ok(Some(months)),
            _ => Err(ConfigError {
                key,
                value: raw,
                reason: "expected a month count between 1 and 120",
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.store_kind(), None);
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            (ENV_STORE, "/tmp/schedule.db"),
            (ENV_HTTP_ADDR, "127.0.0.1:8080"),
            (ENV_INITIAL_MONTHS, "12"),
            (ENV_CHILD_NAME, "Aston"),
            (ENV_HANDOFF_TIME, "17:30"),
        ])
        .unwrap();
        assert_eq!(config.store_kind(), Some(StoreKind::Sqlite));
        assert_eq!(config.http_addr.port(), 8080);
        assert_eq!(config.initial_months, 12);
        assert_eq!(config.continue_months, DEFAULT_CONTINUE_MONTHS);
        let generator = config.generator();
        assert_eq!(generator.child_name, "Aston");
        assert_eq!(generator.handoff_time, NaiveTime::from_hms_opt(17, 30, 0).unwrap());
    }

    #[test]
    fn rejects_bad_values() {
        let err = config_from(&[(ENV_CONTINUE_MONTHS, "0")]).unwrap_err();
        assert_eq!(err.key, ENV_CONTINUE_MONTHS);
        assert!(config_from(&[(ENV_HANDOFF_TIME, "6pm")]).is_err());
        assert!(config_from(&[(ENV_HTTP_ADDR, "nowhere")]).is_err());
    }

    #[test]
    fn json_store_for_other_extensions() {
        let config = config_from(&[(ENV_STORE, "schedule.json")]).unwrap();
        assert_eq!(config.store_kind(), Some(StoreKind::Json));
    }
}
