use log::{warn, LevelFilter};
use std::{fmt::Display, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use api::{BackendConfig, CORE_API_BASE_URL, DEFAULT_AVAILABILITY_URL, DEFAULT_LOGIN_URL};

pub struct Config {
    pub address: SocketAddr,
    pub core_url: String,
    pub availability_url: String,
    pub login_url: String,
    pub token_file: PathBuf,
    pub timeout: Duration,
    pub log_level: LevelFilter,
}

impl Config {
    /// Reads the `CAMPUS_*` variables. Call `dotenv` first so a `.env` file is honored.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            address: parse_or(&var, "CAMPUS_ADDRESS", SocketAddr::from(([127, 0, 0, 1], 3030))),
            core_url: var("CAMPUS_CORE_URL").unwrap_or_else(|| CORE_API_BASE_URL.to_string()),
            availability_url: var("CAMPUS_AVAILABILITY_URL")
                .unwrap_or_else(|| DEFAULT_AVAILABILITY_URL.to_string()),
            login_url: var("CAMPUS_LOGIN_URL").unwrap_or_else(|| DEFAULT_LOGIN_URL.to_string()),
            token_file: var("CAMPUS_TOKEN_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("session.json")),
            timeout: Duration::from_secs(parse_or(&var, "CAMPUS_REQUEST_TIMEOUT_SECS", 30)),
            log_level: parse_or(&var, "CAMPUS_LOG", LevelFilter::Info),
        }
    }

    pub fn backend(&self) -> BackendConfig {
        BackendConfig {
            core_url: self.core_url.clone(),
            availability_url: self.availability_url.clone(),
            login_url: self.login_url.clone(),
            token_file: Some(self.token_file.clone()),
            timeout: self.timeout,
        }
    }
}

/// Parses variable `key`, falling back to `default` when it is unset or invalid.
fn parse_or<F, T>(var: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match var(key) {
        Some(value) => match value.trim().parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Invalid {}={:?} ({}), using {}", key, value, e, default);
                default
            }
        },
        None => default,
    }
}
