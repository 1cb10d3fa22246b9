use log::warn;
use std::env;
use std::time::Duration;

const DEFAULT_API_URL: &str = "https://bookpoll.vercel.app";
const DEFAULT_DATABASE_URL: &str = "sqlite:book_poll.db";
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub database_url: String,
    pub search_debounce: Duration,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    // Reads the process environment; call dotenvy::dotenv() first to pick up a .env file.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = lookup("BOOK_POLL_API_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let debounce_ms = match lookup("SEARCH_DEBOUNCE_MS") {
            Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
                warn!(
                    "Invalid SEARCH_DEBOUNCE_MS '{}', using {}ms",
                    raw, DEFAULT_SEARCH_DEBOUNCE_MS
                );
                DEFAULT_SEARCH_DEBOUNCE_MS
            }),
            None => DEFAULT_SEARCH_DEBOUNCE_MS,
        };

        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            database_url,
            search_debounce: Duration::from_millis(debounce_ms),
            admin_username: lookup("ADMIN_USERNAME").filter(|v| !v.is_empty()),
            admin_password: lookup("ADMIN_PASSWORD").filter(|v| !v.is_empty()),
        }
    }
}
