//! Error types at the component seams. Orchestration code wraps these in `anyhow`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("bad request URL: {0}")]
    Url(String),

    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider error {code}: {description}")]
    Provider { code: String, description: String },
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),

    #[error("invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("invalid watchlist: {0}")]
    Watchlist(String),
}
