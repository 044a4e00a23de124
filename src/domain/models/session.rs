use serde::Deserialize;
use serde::Serialize;

/// Identity of the logged in user. The four fields are persisted and cleared
/// together; `uid` being set is what makes a session authenticated.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub uid: Option<i64>,
    pub session_id: Option<String>,
    pub login: Option<String>,
    pub csrf_token: Option<String>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        return self.uid.is_some();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SessionStatus {
    Anonymous,
    Authenticated,
    Restoring,
}
