use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("{message}")]
    Http { status: u16, message: String },

    /// The server answered 2xx with an `error` member. `data` is the raw
    /// error payload as sent by the server.
    #[error("{message}")]
    Rpc {
        message: String,
        data: Option<Value>,
    },

    #[error("Invalid response from server: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Invalid Credentials")]
    InvalidCredentials,
}
