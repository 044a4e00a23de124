#[cfg(test)]
#[path = "rpc_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;

use super::connection::Connection;
use super::connection::CSRF_TOKEN_HEADER;
use super::connection::SESSION_ID_HEADER;
use crate::domain::models::CallOutcome;
use crate::domain::models::ClientError;
use crate::domain::models::HttpErrorBody;
use crate::domain::models::RpcRequest;
use crate::domain::models::RpcResponse;
use crate::domain::models::TokenResponse;
use crate::domain::services::Session;

const ERROR_SNIPPET_LEN: usize = 300;

fn http_error(status: StatusCode, body: &str) -> ClientError {
    let code = status.as_u16();

    if let Ok(server_err) = serde_json::from_str::<HttpErrorBody>(body) {
        return ClientError::Http {
            status: code,
            message: format!("HTTP {code}: {}", server_err.summary()),
        };
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        let snippet = trimmed.chars().take(ERROR_SNIPPET_LEN).collect::<String>();
        return ClientError::Http {
            status: code,
            message: format!("HTTP {code}: {snippet}"),
        };
    }

    return ClientError::Http {
        status: code,
        message: format!("HTTP Error: {code}"),
    };
}

/// JSON-RPC transport for `/web/dataset/call_kw`. No retries: every failure is
/// classified once and handed back.
#[derive(Clone, Debug)]
pub struct RpcClient {
    connection: Connection,
}

impl RpcClient {
    pub fn new(connection: Connection) -> RpcClient {
        return RpcClient { connection };
    }

    /// Fetches and caches a CSRF token. Failing here is not fatal, the call
    /// proceeds without the header.
    pub async fn fetch_csrf_token(&self, session: &mut Session) -> Option<String> {
        let mut req = self
            .connection
            .client()
            .get(self.connection.endpoint("/web/session/token"));
        if let Some(sid) = session.session_id() {
            req = req.header(SESSION_ID_HEADER, sid);
        }

        let res = match req.send().await {
            Ok(res) if res.status().is_success() => res,
            Ok(res) => {
                let status = res.status().as_u16();
                tracing::warn!(status, "CSRF token request failed");
                session
                    .debug_log_mut()
                    .push(&format!("csrf token status {status}"));
                return None;
            }
            Err(err) => {
                tracing::warn!(error = ?err, "CSRF token request failed");
                session.debug_log_mut().push("csrf token unavailable");
                return None;
            }
        };

        let token = match res.json::<TokenResponse>().await {
            Ok(body) => body.result.token,
            Err(err) => {
                tracing::warn!(error = ?err, "CSRF token response was not understood");
                session.debug_log_mut().push("csrf token unreadable");
                return None;
            }
        };

        if let Err(err) = session.set_csrf_token(&token) {
            tracing::warn!(error = ?err, "Failed to cache CSRF token");
        }

        return Some(token);
    }

    #[allow(clippy::implicit_return)]
    pub async fn call(
        &self,
        session: &mut Session,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<CallOutcome> {
        let payload = RpcRequest::new(model, method, args, kwargs);

        if session.csrf_token().is_none() {
            self.fetch_csrf_token(session).await;
        }

        session
            .debug_log_mut()
            .push(&format!("call {model}.{method} (id {})", payload.id));

        let mut req = self
            .connection
            .client()
            .post(self.connection.endpoint("/web/dataset/call_kw"))
            .json(&payload);
        if let Some(sid) = session.session_id() {
            req = req.header(SESSION_ID_HEADER, sid);
        }
        if let Some(token) = session.csrf_token() {
            req = req.header(CSRF_TOKEN_HEADER, token);
        }

        let res = match req.send().await {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(error = ?err, model, method, "RPC request failed");
                session
                    .debug_log_mut()
                    .push(&format!("network error: {err}"));
                bail!(ClientError::Network(err));
            }
        };

        let status = res.status();
        session
            .debug_log_mut()
            .push(&format!("status {}", status.as_u16()));

        if status == StatusCode::FORBIDDEN {
            tracing::warn!(model, method, "RPC call rejected with 403");
            session.expire();
            return Ok(CallOutcome::SessionExpired);
        }

        let text = res.text().await.map_err(ClientError::Network)?;

        if !status.is_success() {
            let err = http_error(status, &text);
            tracing::error!(status = status.as_u16(), error = %err, "RPC call failed");
            session.debug_log_mut().push(&format!("error: {err}"));
            bail!(err);
        }

        let body = match serde_json::from_str::<RpcResponse>(&text) {
            Ok(body) => body,
            Err(err) => {
                session
                    .debug_log_mut()
                    .push(&format!("undecodable response: {err}"));
                bail!(ClientError::Decode(err));
            }
        };

        match body {
            RpcResponse::Failure { error } => {
                let message = error.detail_message();
                tracing::error!(model, method, error = ?error, "RPC error");
                session
                    .debug_log_mut()
                    .push(&format!("rpc error: {message}"));
                bail!(ClientError::Rpc {
                    message,
                    data: error.data,
                });
            }
            RpcResponse::Malformed { error } => {
                let message = match error.as_str() {
                    Some(text) => text.to_string(),
                    None => format!("Unrecognized RPC error: {error}"),
                };
                tracing::error!(model, method, error = ?error, "RPC error");
                session
                    .debug_log_mut()
                    .push(&format!("rpc error: {message}"));
                bail!(ClientError::Rpc {
                    message,
                    data: Some(error),
                });
            }
            RpcResponse::Success { result } => {
                session
                    .debug_log_mut()
                    .push(&format!("ok, {} bytes", text.len()));
                return Ok(CallOutcome::Completed(result));
            }
        }
    }

    /// Like `call`, decoding the result. `None` when the session expired.
    pub async fn call_as<T: DeserializeOwned>(
        &self,
        session: &mut Session,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<Option<T>> {
        let outcome = self.call(session, model, method, args, kwargs).await?;
        let value = match outcome.into_result() {
            Some(value) => value,
            None => return Ok(None),
        };

        let decoded = serde_json::from_value::<T>(value).map_err(ClientError::Decode)?;
        return Ok(Some(decoded));
    }
}
