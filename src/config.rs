use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Tunables of the statistics and scheduling views
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Mastery level a card needs to count as mastered
    pub mastery_threshold: f64,
    pub mastery_min_repetitions: i32,
    /// Cards below this easiness (with enough repetitions) are struggling
    pub struggling_easiness: f64,
    pub struggling_min_repetitions: i32,
    pub minutes_per_card: u32,
    /// Urgency added per day a card is overdue
    pub overdue_weight: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mastery_threshold: 0.7,
            mastery_min_repetitions: 5,
            struggling_easiness: 2.0,
            struggling_min_repetitions: 3,
            minutes_per_card: 2,
            overdue_weight: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub log_level: String,
    pub engine: EngineConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = EngineConfig::default();

        let engine = EngineConfig {
            mastery_threshold: parse_var("SRS_MASTERY_THRESHOLD", defaults.mastery_threshold)?,
            mastery_min_repetitions: parse_var(
                "SRS_MASTERY_MIN_REPETITIONS",
                defaults.mastery_min_repetitions,
            )?,
            minutes_per_card: parse_var("SRS_MINUTES_PER_CARD", defaults.minutes_per_card)?,
            ..defaults
        };

        if !(0.0..=1.0).contains(&engine.mastery_threshold) {
            anyhow::bail!("SRS_MASTERY_THRESHOLD must be between 0 and 1");
        }
        if engine.minutes_per_card == 0 {
            anyhow::bail!("SRS_MINUTES_PER_CARD must be positive");
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://srs.db".into()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            engine,
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == "memory"
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}
