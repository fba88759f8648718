pub mod models;

use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthApi;
use models::{
    Envelope, ForgotPasswordReply, HostelPage, HostelSummary, LoginGrant, ProfileUpdate,
    RegisterRequest, RegisteredUser, TokenPair, UserProfile,
};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const USER_PREFIX: &str = "/api/v1/newuserregister";
const HOSTEL_PREFIX: &str = "/api/v1/hostels";

#[derive(Clone, Debug)]
pub struct ApiOptions {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub proxy: Option<String>,
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: 10,
            proxy: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid API base URL: {url}")]
    InvalidBaseUrl { url: String },

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("{endpoint} answered HTTP {status}: {}", .body.text().unwrap_or_default())]
    Status {
        endpoint: String,
        status: u16,
        body: Envelope,
    },

    #[error("{endpoint} rejected the request: {}", .body.text().unwrap_or_default())]
    Rejected { endpoint: String, body: Envelope },

    #[error("{endpoint} response is missing {field}")]
    MissingData { endpoint: String, field: String },

    #[error("failed to read {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    pub fn http(endpoint: &str, status: u16, body: Envelope) -> Self {
        ApiError::Status {
            endpoint: endpoint.to_string(),
            status,
            body,
        }
    }

    pub fn transport(
        endpoint: &str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        ApiError::Transport {
            endpoint: endpoint.to_string(),
            source: source.into(),
        }
    }

    /// HTTP status, or the status embedded in a rejected body.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Rejected { body, .. } => body.status_code,
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&Envelope> {
        match self {
            ApiError::Status { body, .. } | ApiError::Rejected { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<String> {
        self.body().and_then(Envelope::text)
    }

    pub fn detail(&self) -> Option<&str> {
        self.body().and_then(Envelope::detail_str)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED.as_u16())
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport { .. })
    }
}

/// Client for the hostel REST API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(options: &ApiOptions) -> Result<Self, ApiError> {
        let base_url = options.base_url.trim().trim_end_matches('/').to_string();
        if reqwest::Url::parse(&base_url).is_err() {
            return Err(ApiError::InvalidBaseUrl {
                url: options.base_url.clone(),
            });
        }
        let http = build_http_client(options.proxy.as_deref(), options.timeout_seconds)?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn user_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(&format!("{USER_PREFIX}{path}")))
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn execute(&self, endpoint: &str, request: RequestBuilder) -> Result<Envelope, ApiError> {
        log::debug!("sending {endpoint}");
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::transport(endpoint, e))?;
        let status = response.status();
        log::debug!("{endpoint} answered {status}");

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::transport(endpoint, e))?;
        let body = if bytes.is_empty() {
            Envelope::default()
        } else {
            match serde_json::from_slice::<Envelope>(&bytes) {
                Ok(env) => env,
                Err(e) if status.is_success() => {
                    return Err(ApiError::MissingData {
                        endpoint: endpoint.to_string(),
                        field: format!("a JSON body ({e})"),
                    })
                }
                Err(_) => Envelope::with_detail(&String::from_utf8_lossy(&bytes)),
            }
        };

        if !status.is_success() {
            log::warn!("{endpoint} failed with HTTP {}", status.as_u16());
            return Err(ApiError::http(endpoint, status.as_u16(), body));
        }
        if body.is_rejected() {
            log::warn!("{endpoint} rejected: {}", body.text().unwrap_or_default());
            return Err(ApiError::Rejected {
                endpoint: endpoint.to_string(),
                body,
            });
        }
        Ok(body)
    }

    /// One page of the hostel listing.
    pub async fn list_hostels(&self, skip: u64, limit: u64) -> Result<HostelPage, ApiError> {
        let endpoint = "hostels/all";
        let request = self
            .http
            .get(self.url(&format!("{HOSTEL_PREFIX}/all/")))
            .query(&[("skip", skip), ("limit", limit)]);
        let env = self.execute(endpoint, request).await?;
        let hostels: Vec<HostelSummary> = env.data_as().ok_or_else(|| ApiError::MissingData {
            endpoint: endpoint.to_string(),
            field: "data".to_string(),
        })?;
        let total_count = env
            .field_as::<u64>("total_count")
            .unwrap_or(hostels.len() as u64);
        Ok(HostelPage {
            total_count,
            hostels,
        })
    }

    /// Every hostel, fetched page by page.
    pub async fn all_hostels(&self, page_size: u64) -> Result<Vec<HostelSummary>, ApiError> {
        let limit = page_size.max(1);
        let mut out = Vec::new();
        loop {
            let page = self.list_hostels(out.len() as u64, limit).await?;
            let fetched = page.hostels.len();
            out.extend(page.hostels);
            if fetched == 0 || out.len() as u64 >= page.total_count {
                break;
            }
        }
        Ok(out)
    }
}

fn build_http_client(
    proxy: Option<&str>,
    timeout_seconds: u64,
) -> Result<reqwest::Client, ApiError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static(concat!(
            "hostel-admin/",
            env!("CARGO_PKG_VERSION")
        )),
    );

    let timeout = Duration::from_secs(if timeout_seconds == 0 { 10 } else { timeout_seconds });
    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout);

    if let Some(proxy) = proxy.filter(|p| !p.trim().is_empty()) {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| ApiError::ProxySetup {
            proxy: proxy.to_string(),
            source: e,
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| ApiError::ClientBuild { source: e })
}

fn bearer(request: RequestBuilder, access_token: &str) -> RequestBuilder {
    request.bearer_auth(access_token)
}

impl AuthApi for ApiClient {
    async fn register(&self, request: &RegisterRequest) -> Result<RegisteredUser, ApiError> {
        let endpoint = "register";
        let env = self
            .execute(endpoint, self.user_request(Method::POST, "").json(request))
            .await?;
        env.field_as("user_data").ok_or_else(|| ApiError::MissingData {
            endpoint: endpoint.to_string(),
            field: "user_data".to_string(),
        })
    }

    async fn verify_otp(&self, id: i64, otp: &str) -> Result<Envelope, ApiError> {
        let request = self
            .user_request(Method::POST, "/verify-otp/")
            .query(&[("id", id.to_string().as_str()), ("otp", otp)]);
        self.execute("verify-otp", request).await
    }

    async fn resend_otp(&self, id: i64) -> Result<Envelope, ApiError> {
        let request = self
            .user_request(Method::POST, "/resend-otp/")
            .query(&[("id", id)]);
        self.execute("resend-otp", request).await
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginGrant, ApiError> {
        let endpoint = "login";
        let form = [
            ("grant_type", "password"),
            ("username", username),
            ("password", password),
            ("scope", "client_id"),
            ("client_id", "string"),
            ("client_secret", "string"),
        ];
        let env = self
            .execute(endpoint, self.user_request(Method::POST, "/login/").form(&form))
            .await?;
        let access_token: String = env
            .field_as("access_token")
            .ok_or_else(|| ApiError::MissingData {
                endpoint: endpoint.to_string(),
                field: "access_token".to_string(),
            })?;
        Ok(LoginGrant {
            tokens: TokenPair {
                access_token,
                refresh_token: env.field_as("refresh_token"),
                token_type: env.field_as("token_type"),
            },
            user: env.field_as("user_data"),
            message: env.text(),
        })
    }

    async fn forgot_password(&self, identifier: &str) -> Result<ForgotPasswordReply, ApiError> {
        let request = self
            .user_request(Method::POST, "/forgot-password/")
            .query(&[("identifier", identifier)])
            .json(&json!({ "identifier": identifier }));
        let env = self.execute("forgot-password", request).await?;
        Ok(ForgotPasswordReply {
            accepted: env.is_success(),
            email: env.field_as("email"),
            message: env.text(),
        })
    }

    async fn reset_password(
        &self,
        identifier: &str,
        otp: &str,
        new_password: &str,
    ) -> Result<Envelope, ApiError> {
        let request = self
            .user_request(Method::POST, "/reset-password/")
            .query(&[
                ("identifier", identifier),
                ("otp", otp),
                ("new_password", new_password),
            ])
            .json(&json!({
                "identifier": identifier,
                "otp": otp,
                "new_password": new_password,
            }));
        self.execute("reset-password", request).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let endpoint = "token/refresh";
        let request = self
            .user_request(Method::POST, "/token/refresh")
            .query(&[("refresh_token", refresh_token)]);
        let env = self.execute(endpoint, request).await?;
        env.data_as().ok_or_else(|| ApiError::MissingData {
            endpoint: endpoint.to_string(),
            field: "data.access_token".to_string(),
        })
    }

    async fn change_password(
        &self,
        access_token: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<Envelope, ApiError> {
        let request = bearer(
            self.user_request(Method::POST, "/change-password/"),
            access_token,
        )
        .json(&json!({
            "old_password": old_password,
            "new_password": new_password,
        }));
        self.execute("change-password", request).await
    }

    async fn me(&self, access_token: &str) -> Result<UserProfile, ApiError> {
        let endpoint = "me";
        let env = self
            .execute(
                endpoint,
                bearer(self.user_request(Method::GET, "/me/"), access_token),
            )
            .await?;
        env.data_as().ok_or_else(|| ApiError::MissingData {
            endpoint: endpoint.to_string(),
            field: "data".to_string(),
        })
    }

    async fn update_me(
        &self,
        access_token: &str,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, ApiError> {
        let endpoint = "update_me";
        let path = update.image.display().to_string();
        let bytes = tokio::fs::read(&update.image)
            .await
            .map_err(|source| ApiError::File {
                path: path.clone(),
                source,
            })?;
        let file_name = update
            .image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "profile_image".to_string());

        let mut form = reqwest::multipart::Form::new()
            .text("name", update.name.clone())
            .text("email", update.email.clone())
            .text("mobile", update.mobile.clone())
            .text("is_active", update.is_active.to_string())
            .part(
                "profile_image",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name),
            );
        if let Some(bio) = &update.bio {
            form = form.text("bio", bio.clone());
        }

        let request = bearer(self.user_request(Method::PUT, "/update_me/"), access_token)
            .multipart(form);
        let env = self.execute(endpoint, request).await?;
        env.data_as().ok_or_else(|| ApiError::MissingData {
            endpoint: endpoint.to_string(),
            field: "data".to_string(),
        })
    }

    async fn logout(&self, access_token: &str) -> Result<Envelope, ApiError> {
        let request = bearer(self.user_request(Method::POST, "/logout/"), access_token)
            .json(&json!({}));
        self.execute("logout", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_validated_and_trimmed() {
        let client = ApiClient::new(&ApiOptions {
            base_url: "http://localhost:8000/".to_string(),
            ..ApiOptions::default()
        })
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(
            client.url("/api/v1/hostels/all/"),
            "http://localhost:8000/api/v1/hostels/all/"
        );

        let err = ApiClient::new(&ApiOptions {
            base_url: "not a url".to_string(),
            ..ApiOptions::default()
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn bad_proxy_is_reported() {
        let err = ApiClient::new(&ApiOptions {
            proxy: Some("::not a proxy::".to_string()),
            ..ApiOptions::default()
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::ProxySetup { .. }));
    }

    #[test]
    fn error_helpers_read_status_and_message() {
        let err = ApiError::http("verify-otp", 400, Envelope::with_detail("Invalid OTP"));
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.detail(), Some("Invalid OTP"));
        assert!(!err.is_unauthorized());
        assert_eq!(err.to_string(), "verify-otp answered HTTP 400: Invalid OTP");

        let err = ApiError::transport("login", "connection refused");
        assert!(err.is_transport());
        assert_eq!(err.message(), None);

        let rejected = ApiError::Rejected {
            endpoint: "reset-password".into(),
            body: serde_json::from_value(json!({"status_code": 401, "msg": "expired"})).unwrap(),
        };
        assert!(rejected.is_unauthorized());
    }

    #[tokio::test]
    async fn missing_profile_image_is_a_file_error() {
        let client = ApiClient::new(&ApiOptions::default()).unwrap();
        let update = ProfileUpdate {
            name: "n".into(),
            bio: None,
            email: "e@x.io".into(),
            mobile: "0123456789".into(),
            is_active: true,
            image: std::path::PathBuf::from("/definitely/not/here.png"),
        };
        let err = client.update_me("t", &update).await.unwrap_err();
        assert!(matches!(err, ApiError::File { .. }));
    }
}
