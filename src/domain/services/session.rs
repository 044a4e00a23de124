#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use super::DebugLog;
use super::SessionVault;
use crate::domain::models::ClientError;
use crate::domain::models::Event;
use crate::domain::models::ReloadReason;
use crate::domain::models::SessionState;
use crate::domain::models::SessionStatus;
use crate::infrastructure::transport::connection::Connection;
use crate::infrastructure::transport::connection::SESSION_ID_HEADER;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginParams {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub params: LoginParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResult {
    #[serde(default)]
    pub uid: Value,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub csrf_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub result: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCheckResponse {
    #[serde(default)]
    pub result: Value,
}

/// The server answers `false` or `0` for a failed login instead of leaving
/// `uid` out.
fn truthy_uid(uid: &Value) -> Option<i64> {
    return match uid {
        Value::Number(num) => num.as_i64().filter(|uid| return *uid != 0),
        Value::String(text) => text.parse::<i64>().ok().filter(|uid| return *uid != 0),
        _ => None,
    };
}

/// Login session shared by every component talking to the backend.
///
/// State is hydrated from the vault on construction and only changes through
/// `login`, `restore_session`, `logout` and `expire`. Whenever the session is
/// torn down an `Event::ReloadRequested` is sent so the owner can rebuild its
/// in-memory state.
pub struct Session {
    connection: Connection,
    vault: SessionVault,
    state: SessionState,
    restoring: bool,
    debug_log: DebugLog,
    tx: mpsc::UnboundedSender<Event>,
}

impl Session {
    pub fn new(
        connection: Connection,
        vault: SessionVault,
        tx: mpsc::UnboundedSender<Event>,
    ) -> Session {
        let state = vault.hydrate();

        return Session {
            connection,
            vault,
            state,
            restoring: false,
            debug_log: DebugLog::default(),
            tx,
        };
    }

    pub fn is_logged_in(&self) -> bool {
        return self.state.is_authenticated();
    }

    pub fn status(&self) -> SessionStatus {
        if self.restoring {
            return SessionStatus::Restoring;
        }

        if self.is_logged_in() {
            return SessionStatus::Authenticated;
        }

        return SessionStatus::Anonymous;
    }

    pub fn state(&self) -> &SessionState {
        return &self.state;
    }

    pub fn uid(&self) -> Option<i64> {
        return self.state.uid;
    }

    pub fn session_id(&self) -> Option<&str> {
        return self.state.session_id.as_deref();
    }

    pub fn login_name(&self) -> Option<&str> {
        return self.state.login.as_deref();
    }

    pub fn csrf_token(&self) -> Option<&str> {
        return self.state.csrf_token.as_deref();
    }

    pub fn debug_log(&self) -> &DebugLog {
        return &self.debug_log;
    }

    pub fn debug_log_mut(&mut self) -> &mut DebugLog {
        return &mut self.debug_log;
    }

    /// Caches a CSRF token fetched outside of login or a session check.
    pub fn set_csrf_token(&mut self, token: &str) -> Result<()> {
        self.vault.persist_csrf_token(token)?;
        self.state.csrf_token = Some(token.to_string());

        return Ok(());
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let req = LoginRequest {
            params: LoginParams {
                login: username.to_string(),
                password: password.to_string(),
            },
        };

        self.debug_log.push(&format!("login {username}"));
        let res = self
            .connection
            .client()
            .post(self.connection.endpoint("/web/login"))
            .json(&req)
            .send()
            .await;

        let res = match res {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(error = ?err, "Login request failed");
                self.debug_log.push(&format!("login network error: {err}"));
                bail!(ClientError::Network(err));
            }
        };

        let text = res.text().await.map_err(ClientError::Network)?;
        let body: LoginResponse = serde_json::from_str(&text).map_err(ClientError::Decode)?;

        let result = serde_json::from_value::<LoginResult>(body.result).ok();
        let uid = result
            .as_ref()
            .and_then(|result| return truthy_uid(&result.uid));

        let (uid, result) = match (uid, result) {
            (Some(uid), Some(result)) => (uid, result),
            _ => {
                tracing::warn!(login = username, "Login rejected");
                self.debug_log.push("login rejected");
                bail!(ClientError::InvalidCredentials);
            }
        };

        let state = SessionState {
            uid: Some(uid),
            session_id: result.session_id,
            login: Some(username.to_string()),
            csrf_token: result.csrf_token,
        };

        self.vault.persist(&state)?;
        self.state = state;
        self.debug_log.push(&format!("login ok, uid {uid}"));

        return Ok(());
    }

    async fn check_session(&mut self) -> Result<Option<String>> {
        let mut req = self
            .connection
            .client()
            .post(self.connection.endpoint("/web/session/check"))
            .json(&serde_json::json!({ "params": {} }));

        if let Some(sid) = &self.state.session_id {
            req = req.header(SESSION_ID_HEADER, sid);
        }

        let res = req.send().await.map_err(ClientError::Network)?;
        let status = res.status();
        self.debug_log
            .push(&format!("session check status {}", status.as_u16()));

        if !status.is_success() {
            bail!(ClientError::Http {
                status: status.as_u16(),
                message: format!("Session check failed: HTTP {}", status.as_u16()),
            });
        }

        let text = res.text().await.map_err(ClientError::Network)?;
        let body: SessionCheckResponse =
            serde_json::from_str(&text).map_err(ClientError::Decode)?;

        let token = body
            .result
            .get("csrf_token")
            .and_then(|token| return token.as_str())
            .filter(|token| return !token.is_empty())
            .map(|token| return token.to_string());

        return Ok(token);
    }

    /// Validates a session hydrated from storage. Anything but a successful
    /// check logs the user out, so this never leaves an error for the caller.
    pub async fn restore_session(&mut self) -> bool {
        if !self.is_logged_in() {
            self.debug_log.push("restore skipped, not authenticated");
            return false;
        }

        self.restoring = true;
        let res = self.check_session().await;
        self.restoring = false;

        let token = match res {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!(error = ?err, "Stored session is no longer valid");
                self.sign_out(ReloadReason::SessionRejected).await;
                return false;
            }
        };

        if let Some(token) = token {
            let mut state = self.state.clone();
            state.csrf_token = Some(token);
            if let Err(err) = self.vault.persist(&state) {
                tracing::warn!(error = ?err, "Failed to persist refreshed CSRF token");
            }
            self.state = state;
        }

        return true;
    }

    pub async fn logout(&mut self) {
        self.sign_out(ReloadReason::Logout).await;
    }

    /// Tears the session down after the server refused it mid-call.
    pub fn expire(&mut self) {
        tracing::warn!("Session expired, clearing stored session");
        self.debug_log.push("session expired");
        self.reset(ReloadReason::SessionExpired);
    }

    async fn sign_out(&mut self, reason: ReloadReason) {
        let mut req = self
            .connection
            .client()
            .post(self.connection.endpoint("/web/session/destroy"))
            .json(&serde_json::json!({ "params": {} }));

        if let Some(sid) = &self.state.session_id {
            req = req.header(SESSION_ID_HEADER, sid);
        }

        if let Err(err) = req.send().await {
            tracing::debug!(error = ?err, "Session destroy notification failed");
        }

        self.debug_log.clear();
        self.reset(reason);
    }

    fn reset(&mut self, reason: ReloadReason) {
        self.state = SessionState::default();
        self.restoring = false;

        if let Err(err) = self.vault.clear() {
            tracing::error!(error = ?err, "Failed to clear session storage");
        }

        // The receiver may be gone when the application is shutting down.
        let _ = self.tx.send(Event::ReloadRequested(reason));
    }
}
