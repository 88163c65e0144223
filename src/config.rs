use std::env;
use std::str::FromStr;

use anyhow::{anyhow, Context};

use crate::analytics::trends::DEFAULT_TREND_DAYS;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string; records are kept in memory when unset.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub cors_extra_origins: Vec<String>,

    pub jwt_secret: String,
    pub jwt_access_ttl_secs: i64,

    pub default_trend_days: i64,
    pub max_trend_days: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.is_empty() {
            return Err(anyhow!("JWT_SECRET must not be empty"));
        }

        let config = Self {
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_var("PORT", 8080)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            cors_extra_origins: env::var("CORS_EXTRA_ORIGINS")
                .map(|v| split_origins(&v))
                .unwrap_or_default(),

            jwt_secret,
            jwt_access_ttl_secs: parse_var("JWT_ACCESS_TTL_SECS", 900)?,

            default_trend_days: parse_var("DEFAULT_TREND_DAYS", DEFAULT_TREND_DAYS)?,
            max_trend_days: parse_var("MAX_TREND_DAYS", 365)?,
        };

        if config.max_trend_days < 1 {
            return Err(anyhow!("MAX_TREND_DAYS must be at least 1"));
        }
        if !(1..=config.max_trend_days).contains(&config.default_trend_days) {
            return Err(anyhow!(
                "DEFAULT_TREND_DAYS must be between 1 and MAX_TREND_DAYS ({})",
                config.max_trend_days
            ));
        }
        Ok(config)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Trend window for a requested `days`: the default when absent or not
    /// positive, otherwise capped at `max_trend_days`.
    pub fn trend_days(&self, requested: Option<i64>) -> i64 {
        match requested {
            Some(days) if days > 0 => days.min(self.max_trend_days),
            _ => self.default_trend_days,
        }
    }

    /// Every origin allowed by CORS, primary frontend first.
    pub fn allowed_origins(&self) -> Vec<String> {
        std::iter::once(self.frontend_url.clone())
            .chain(self.cors_extra_origins.iter().cloned())
            .collect()
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{name} must be a number: {e}")),
        Err(_) => Ok(default),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        database_url: None,
        host: "127.0.0.1".into(),
        port: 0,
        frontend_url: "http://localhost:3000".into(),
        cors_extra_origins: Vec::new(),
        jwt_secret: "test-secret".into(),
        jwt_access_ttl_secs: 900,
        default_trend_days: 30,
        max_trend_days: 365,
    }
}
