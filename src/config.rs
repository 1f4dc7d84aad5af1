use std::time::Duration;

use anyhow::{Context, Result};

#[derive(Clone, Debug)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: String,
}

pub fn load() -> Result<Config> {
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
    let addr = std::env::var("BIND_ADDR").unwrap_or("0.0.0.0:3001".to_string());

    Ok(Config {
        database: DatabaseConfig { url },
        server: ServerConfig { addr },
    })
}

/// Email domain buyers must belong to; the shop is campus-exclusive.
pub fn allowed_email_domain() -> String {
    std::env::var("ALLOWED_EMAIL_DOMAIN").unwrap_or("cvsu.edu.ph".to_string())
}

/// Blob store bucket holding uploaded payment receipt images.
pub fn receipt_bucket() -> String {
    std::env::var("RECEIPT_BUCKET").unwrap_or("payment-picture".to_string())
}

/// Upper bound on a single OCR recognition call.
pub fn ocr_timeout() -> Duration {
    let secs = std::env::var("OCR_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(30);
    Duration::from_secs(secs)
}
