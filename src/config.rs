use std::net::IpAddr;

use chrono::Duration;

/// Which persistence backend the server runs on.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreKind {
    Postgres { database_url: String },
    Memory,
}

#[derive(Debug, Clone)]
pub struct SuperAdminSeed {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreKind,
    pub jwt_secret: String,
    pub jwt_refresh_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub host: IpAddr,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub max_body_size: usize,
    pub default_timezone: String,
    pub log_level: String,
    pub superadmin: Option<SuperAdminSeed>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| format!("Missing required environment variable: {key}"))
        };
        let or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let store = match or("DVRA_STORE", "postgres").as_str() {
            "postgres" => StoreKind::Postgres { database_url: required("DATABASE_URL")? },
            "memory" => StoreKind::Memory,
            other => return Err(format!("Invalid DVRA_STORE: {other} (expected postgres or memory)")),
        };

        let jwt_secret = required("JWT_SECRET")?;
        let jwt_refresh_secret = required("JWT_REFRESH_SECRET")?;
        if jwt_secret == jwt_refresh_secret {
            return Err("JWT_REFRESH_SECRET must differ from JWT_SECRET".to_string());
        }

        let access_ttl: i64 = or("DVRA_ACCESS_TTL_SECS", "3600")
            .parse()
            .map_err(|e| format!("Invalid DVRA_ACCESS_TTL_SECS: {e}"))?;
        let refresh_ttl: i64 = or("DVRA_REFRESH_TTL_SECS", "2592000")
            .parse()
            .map_err(|e| format!("Invalid DVRA_REFRESH_TTL_SECS: {e}"))?;

        let host: IpAddr = or("DVRA_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid DVRA_HOST: {e}"))?;

        let port: u16 = or("DVRA_PORT", "8080")
            .parse()
            .map_err(|e| format!("Invalid DVRA_PORT: {e}"))?;

        let cors_origins = or("DVRA_CORS_ORIGINS", "http://localhost:3000,http://localhost:8080")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        let max_body_size: usize = or("DVRA_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid DVRA_MAX_BODY_SIZE: {e}"))?;

        let superadmin = match (lookup("DVRA_SUPERADMIN_EMAIL"), lookup("DVRA_SUPERADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(SuperAdminSeed { email, password }),
            (None, None) => None,
            _ => {
                return Err(
                    "DVRA_SUPERADMIN_EMAIL and DVRA_SUPERADMIN_PASSWORD must be set together".to_string(),
                );
            }
        };

        Ok(Config {
            store,
            jwt_secret,
            jwt_refresh_secret,
            access_ttl: Duration::seconds(access_ttl),
            refresh_ttl: Duration::seconds(refresh_ttl),
            host,
            port,
            cors_origins,
            max_body_size,
            default_timezone: or("DVRA_DEFAULT_TIMEZONE", "America/Bogota"),
            log_level: or("DVRA_LOG_LEVEL", "info"),
            superadmin,
        })
    }
}
