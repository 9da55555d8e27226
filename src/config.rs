use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub account_service_url: String,
    pub account_service_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok(); // Load .env file if present

        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL")?,
            account_service_url: env::var("ACCOUNT_SERVICE_URL")?,
            account_service_timeout_secs: env::var("ACCOUNT_SERVICE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
        })
    }
}
