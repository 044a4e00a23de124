#[cfg(test)]
#[path = "rpc_test.rs"]
mod tests;

use rand::Rng;
use serde::de;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcParams {
    pub model: String,
    pub method: String,
    pub args: Vec<Value>,
    pub kwargs: Map<String, Value>,
}

/// JSON-RPC envelope posted to `/web/dataset/call_kw`. The outer `method` is
/// always `call`, the model method travels inside `params`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: RpcParams,
    pub id: u32,
}

impl RpcRequest {
    pub fn new(
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> RpcRequest {
        return RpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: "call".to_string(),
            params: RpcParams {
                model: model.to_string(),
                method: method.to_string(),
                args,
                kwargs,
            },
            id: rand::thread_rng().gen_range(0..1_000_000),
        };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcErrorBody {
    /// The server usually puts the real exception text in `data.message`,
    /// with `message` holding a generic summary.
    pub fn detail_message(&self) -> String {
        if let Some(detail) = self
            .data
            .as_ref()
            .and_then(|data| return data.get("message"))
            .and_then(|message| return message.as_str())
        {
            return detail.to_string();
        }

        return self.message.to_string();
    }
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Err(de::Error::custom("error is null"));
    }

    return Ok(value);
}

/// Response body of a JSON-RPC call. Variants are tried in order, so a body
/// carrying both fields is treated as an error and an `error` member of any
/// other shape still counts as one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcResponse {
    Failure {
        error: RpcErrorBody,
    },
    Malformed {
        #[serde(deserialize_with = "deserialize_present")]
        error: Value,
    },
    Success {
        #[serde(default)]
        result: Value,
    },
}

/// Error shape some non-2xx responses carry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HttpErrorBody {
    pub error: RpcErrorBody,
}

impl HttpErrorBody {
    pub fn summary(&self) -> String {
        if let Some(kind) = &self.error.kind {
            return format!("{kind}: {message}", message = self.error.message);
        }

        return self.error.message.to_string();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResult {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub result: TokenResult,
}

/// What a call resolved to. A 403 is absorbed into a session reset and
/// reported as `SessionExpired` rather than as an empty result.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    Completed(Value),
    SessionExpired,
}

impl CallOutcome {
    pub fn into_result(self) -> Option<Value> {
        return match self {
            CallOutcome::Completed(value) => Some(value),
            CallOutcome::SessionExpired => None,
        };
    }
}
