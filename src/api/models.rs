use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response body shared by every endpoint of the hostel API.
///
/// Handlers answer `{status, status_code, msg | message, data}` and put some
/// payloads (tokens, `user_data`) beside `data`; framework errors answer
/// `{detail}`. Anything not named here lands in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Envelope {
    pub fn with_message(message: &str) -> Self {
        Self {
            message: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn with_detail(detail: &str) -> Self {
        Self {
            detail: Some(Value::String(detail.to_string())),
            ..Self::default()
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_extra(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    /// First human-readable message: `msg`, `message`, `detail`, `data.detail`.
    pub fn text(&self) -> Option<String> {
        if let Some(m) = self.msg.as_deref().filter(|m| !m.is_empty()) {
            return Some(m.to_string());
        }
        if let Some(m) = self.message.as_deref().filter(|m| !m.is_empty()) {
            return Some(m.to_string());
        }
        if let Some(detail) = self.detail.as_ref().and_then(detail_text) {
            return Some(detail);
        }
        self.data
            .as_ref()
            .and_then(|d| d.get("detail"))
            .and_then(detail_text)
    }

    /// `detail` when it is a plain string, as FastAPI's HTTPException sends it.
    pub fn detail_str(&self) -> Option<&str> {
        self.detail.as_ref().and_then(Value::as_str)
    }

    /// The body reports failure even though the HTTP status may be 2xx.
    pub fn is_rejected(&self) -> bool {
        let status_error = self
            .status
            .as_deref()
            .map(|s| s.eq_ignore_ascii_case("error"))
            .unwrap_or(false);
        let code_error = self
            .status_code
            .map(|c| !(200..300).contains(&c))
            .unwrap_or(false);
        status_error || code_error
    }

    pub fn is_success(&self) -> bool {
        self.status
            .as_deref()
            .map(|s| s.eq_ignore_ascii_case("success"))
            .unwrap_or(false)
    }

    pub fn data_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.data
            .clone()
            .and_then(|d| serde_json::from_value(d).ok())
    }

    /// Looks `key` up beside `data` first, then inside it.
    pub fn field_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.extra
            .get(key)
            .or_else(|| self.data.as_ref().and_then(|d| d.get(key)))
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
    }
}

fn detail_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|i| i.get("msg").and_then(Value::as_str))
                .map(str::to_string)
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("; "))
            }
        }
        _ => None,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub password: String,
    pub user_role: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RegisteredUser {
    pub id: i64,
    #[serde(default)]
    pub user_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub user_role: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub verified_at: Option<String>,
    #[serde(default)]
    pub created_on: Option<String>,
    #[serde(default)]
    pub updated_on: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoginGrant {
    pub tokens: TokenPair,
    pub user: Option<UserProfile>,
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForgotPasswordReply {
    pub accepted: bool,
    pub email: Option<String>,
    pub message: Option<String>,
}

/// Form fields for `update_me`. The image is uploaded from a local file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: String,
    pub bio: Option<String>,
    pub email: String,
    pub mobile: String,
    pub is_active: bool,
    pub image: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostelSummary {
    pub id: u64,
    #[serde(default)]
    pub hostel_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostelPage {
    pub total_count: u64,
    pub hostels: Vec<HostelSummary>,
}
