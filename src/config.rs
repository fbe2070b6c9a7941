use std::env;

use anyhow::{bail, Context};

pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Process settings. `JWT_SECRET` is only validated here; `auth` reads it
/// from the environment when signing and verifying.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Absent means the in-memory store is used.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub run_migrations: bool,
    pub frontend_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            bail!("JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} characters long");
        }

        let database_url = var("DATABASE_URL").filter(|s| !s.is_empty());
        if database_url.is_none() && !cfg!(feature = "inmem-store") {
            bail!("DATABASE_URL must be set when the in-memory store is not compiled in");
        }

        Ok(Self {
            database_url,
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: var("PORT")
                .unwrap_or_else(|| "5000".to_string())
                .parse()
                .context("PORT must be a port number")?,
            db_max_connections: var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            run_migrations: match var("RUN_MIGRATIONS").as_deref() {
                None => true,
                Some(v) => !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"),
            },
            frontend_url: var("FRONTEND_URL").filter(|s| !s.is_empty()),
        })
    }
}
