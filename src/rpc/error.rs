use thiserror::Error;

use crate::config::ConfigError;

/// Failures of the JSON-RPC layer. Domain syntax errors never end up here.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("init error: {0}")]
    Init(#[from] ConfigError),

    #[error("http post error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error reported by the server, `message: data.message`.
    #[error("{0}")]
    Remote(String),

    #[error("login failed")]
    LoginFailed,

    #[error("not logged in")]
    NotLoggedIn,

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

pub type Result<T> = std::result::Result<T, RpcError>;
