//! Credential flows: registration and OTP, login and logout, password
//! recovery, password change and the profile.
//!
//! Every flow takes an [`AuthApi`] and a [`SessionStore`] and answers with an
//! [`Outcome`]: a notice for the user, inline field errors and an optional
//! redirect. Server and transport failures are outcomes, not errors; only
//! local session storage failures surface as [`FlowError`].

pub mod login;
pub mod password;
pub mod profile;
pub mod register;
pub mod validation;

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::api::models::{
    Envelope, ForgotPasswordReply, LoginGrant, ProfileUpdate, RegisterRequest, RegisteredUser,
    TokenPair, UserProfile,
};
use crate::api::ApiError;
use crate::session::{SessionError, SessionStore};

pub const REDIRECT_DELAY: Duration = Duration::from_secs(2);
pub const RESET_REDIRECT_DELAY: Duration = Duration::from_secs(3);

pub const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";
pub const NETWORK_ERROR: &str = "Network error. Please try again later.";

/// The hostel API as the flows consume it.
pub trait AuthApi {
    fn register(
        &self,
        request: &RegisterRequest,
    ) -> impl Future<Output = Result<RegisteredUser, ApiError>> + Send;

    fn verify_otp(
        &self,
        id: i64,
        otp: &str,
    ) -> impl Future<Output = Result<Envelope, ApiError>> + Send;

    fn resend_otp(&self, id: i64) -> impl Future<Output = Result<Envelope, ApiError>> + Send;

    fn login(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<LoginGrant, ApiError>> + Send;

    fn forgot_password(
        &self,
        identifier: &str,
    ) -> impl Future<Output = Result<ForgotPasswordReply, ApiError>> + Send;

    fn reset_password(
        &self,
        identifier: &str,
        otp: &str,
        new_password: &str,
    ) -> impl Future<Output = Result<Envelope, ApiError>> + Send;

    fn refresh(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = Result<TokenPair, ApiError>> + Send;

    fn change_password(
        &self,
        access_token: &str,
        old_password: &str,
        new_password: &str,
    ) -> impl Future<Output = Result<Envelope, ApiError>> + Send;

    fn me(&self, access_token: &str) -> impl Future<Output = Result<UserProfile, ApiError>> + Send;

    fn update_me(
        &self,
        access_token: &str,
        update: &ProfileUpdate,
    ) -> impl Future<Output = Result<UserProfile, ApiError>> + Send;

    fn logout(&self, access_token: &str) -> impl Future<Output = Result<Envelope, ApiError>> + Send;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub tone: Tone,
    pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    SignIn,
    VerifyOtp,
    ResetPassword,
    Dashboard,
}

impl Route {
    pub fn name(self) -> &'static str {
        match self {
            Route::SignIn => "sign-in",
            Route::VerifyOtp => "verify-otp",
            Route::ResetPassword => "reset-password",
            Route::Dashboard => "dashboard",
        }
    }

    /// The command that continues the flow from this route.
    pub fn command_hint(self) -> &'static str {
        match self {
            Route::SignIn => "hostel-admin login",
            Route::VerifyOtp => "hostel-admin verify-otp --otp <CODE>",
            Route::ResetPassword => "hostel-admin reset-password --otp <CODE>",
            Route::Dashboard => "hostel-admin screen <SCREEN>",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Redirect {
    pub route: Route,
    pub after: Duration,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    pub notice: Option<Notice>,
    pub field_errors: BTreeMap<&'static str, String>,
    pub redirect: Option<Redirect>,
    pub profile: Option<UserProfile>,
}

impl Outcome {
    fn with_notice(tone: Tone, text: impl Into<String>) -> Self {
        Self {
            notice: Some(Notice {
                tone,
                text: text.into(),
            }),
            ..Self::default()
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::with_notice(Tone::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::with_notice(Tone::Error, text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::with_notice(Tone::Info, text)
    }

    pub fn redirect(mut self, route: Route, after: Duration) -> Self {
        self.redirect = Some(Redirect { route, after });
        self
    }

    pub fn field_error(mut self, field: &'static str, text: impl Into<String>) -> Self {
        self.field_errors.insert(field, text.into());
        self
    }

    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn is_success(&self) -> bool {
        self.field_errors.is_empty()
            && self
                .notice
                .as_ref()
                .map(|n| n.tone != Tone::Error)
                .unwrap_or(true)
    }

    pub fn text(&self) -> Option<&str> {
        self.notice.as_ref().map(|n| n.text.as_str())
    }

    /// Outcome for an authorized call whose credentials could not be renewed.
    pub fn session_expired() -> Self {
        Self::error(SESSION_EXPIRED).redirect(Route::SignIn, REDIRECT_DELAY)
    }

    pub fn signed_out() -> Self {
        Self::error("You are not logged in. Please log in first.")
            .redirect(Route::SignIn, Duration::ZERO)
    }
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Result of an authorized call after at most one credential refresh.
#[derive(Debug)]
pub enum Authorized<T> {
    Done(T),
    Failed(ApiError),
    Expired,
    SignedOut,
}

/// Runs `call` with the stored access token. A 401 triggers exactly one
/// refresh and exactly one retry; a failed refresh signs the session out.
pub async fn with_refresh<A, T, F, Fut>(
    api: &A,
    store: &dyn SessionStore,
    mut call: F,
) -> Result<Authorized<T>, FlowError>
where
    A: AuthApi,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let session = store.load()?;
    let Some(access) = session.access_token.clone() else {
        return Ok(Authorized::SignedOut);
    };

    let err = match call(access).await {
        Ok(value) => return Ok(Authorized::Done(value)),
        Err(e) if e.is_unauthorized() => e,
        Err(e) => return Ok(Authorized::Failed(e)),
    };
    log::info!("access token rejected ({err}), refreshing once");

    let Some(refresh_token) = session.refresh_token.clone() else {
        store.update(&mut |s| s.sign_out())?;
        return Ok(Authorized::Expired);
    };

    let tokens = match api.refresh(&refresh_token).await {
        Ok(tokens) => tokens,
        Err(e) => {
            log::warn!("token refresh failed: {e}");
            store.update(&mut |s| s.sign_out())?;
            return Ok(Authorized::Expired);
        }
    };
    store.update(&mut |s| s.store_tokens(&tokens))?;

    match call(tokens.access_token.clone()).await {
        Ok(value) => Ok(Authorized::Done(value)),
        Err(e) if e.is_unauthorized() => {
            log::warn!("retry after refresh still unauthorized");
            Ok(Authorized::Failed(e))
        }
        Err(e) => Ok(Authorized::Failed(e)),
    }
}

/// Message for a failure that has no flow-specific wording.
pub(crate) fn failure_text(err: &ApiError, fallback: &str) -> String {
    if err.is_transport() {
        return NETWORK_ERROR.to_string();
    }
    err.message().unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-process stand-in for the hostel API with scripted replies.

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct FakeApi {
        pub calls: Mutex<Vec<String>>,
        replies: Mutex<VecDeque<Result<serde_json::Value, ApiError>>>,
        refresh_replies: Mutex<VecDeque<Result<TokenPair, ApiError>>>,
        pub refreshes: AtomicUsize,
    }

    impl FakeApi {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reply(self, value: Result<serde_json::Value, ApiError>) -> Self {
            self.replies
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push_back(value);
            self
        }

        pub fn refresh_reply(self, value: Result<TokenPair, ApiError>) -> Self {
            self.refresh_replies
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push_back(value);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
        }

        fn next<T: serde::de::DeserializeOwned>(&self, call: String) -> Result<T, ApiError> {
            self.calls
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(call.clone());
            let reply = self
                .replies
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .pop_front()
                .unwrap_or_else(|| Ok(serde_json::json!({})));
            let value = reply?;
            serde_json::from_value(value).map_err(|e| ApiError::MissingData {
                endpoint: call,
                field: e.to_string(),
            })
        }
    }

    impl AuthApi for FakeApi {
        async fn register(&self, request: &RegisterRequest) -> Result<RegisteredUser, ApiError> {
            self.next(format!("register {}", request.email))
        }

        async fn verify_otp(&self, id: i64, otp: &str) -> Result<Envelope, ApiError> {
            self.next(format!("verify-otp {id} {otp}"))
        }

        async fn resend_otp(&self, id: i64) -> Result<Envelope, ApiError> {
            self.next(format!("resend-otp {id}"))
        }

        async fn login(&self, username: &str, _password: &str) -> Result<LoginGrant, ApiError> {
            let env: Envelope = self.next(format!("login {username}"))?;
            let tokens = TokenPair {
                access_token: env.field_as("access_token").unwrap_or_default(),
                refresh_token: env.field_as("refresh_token"),
                token_type: None,
            };
            Ok(LoginGrant {
                tokens,
                user: env.field_as("user_data"),
                message: env.text(),
            })
        }

        async fn forgot_password(&self, identifier: &str) -> Result<ForgotPasswordReply, ApiError> {
            let env: Envelope = self.next(format!("forgot-password {identifier}"))?;
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
            _new_password: &str,
        ) -> Result<Envelope, ApiError> {
            self.next(format!("reset-password {identifier} {otp}"))
        }

        async fn refresh(&self, _refresh_token: &str) -> Result<TokenPair, ApiError> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            self.refresh_replies
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::http("token/refresh", 401, Envelope::default())))
        }

        async fn change_password(
            &self,
            access_token: &str,
            _old_password: &str,
            _new_password: &str,
        ) -> Result<Envelope, ApiError> {
            self.next(format!("change-password {access_token}"))
        }

        async fn me(&self, access_token: &str) -> Result<UserProfile, ApiError> {
            self.next(format!("me {access_token}"))
        }

        async fn update_me(
            &self,
            access_token: &str,
            update: &ProfileUpdate,
        ) -> Result<UserProfile, ApiError> {
            self.next(format!("update-me {access_token} {}", update.name))
        }

        async fn logout(&self, access_token: &str) -> Result<Envelope, ApiError> {
            self.next(format!("logout {access_token}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeApi;
    use super::*;
    use crate::session::{MemorySessionStore, Session};
    use serde_json::json;

    fn signed_in() -> MemorySessionStore {
        MemorySessionStore::new(Session {
            access_token: Some("old".into()),
            refresh_token: Some("refresh".into()),
            ..Session::default()
        })
    }

    fn unauthorized() -> ApiError {
        ApiError::http("me", 401, Envelope::with_detail("Could not validate credentials"))
    }

    #[tokio::test]
    async fn unauthorized_call_refreshes_and_retries_once() {
        let api = FakeApi::new()
            .reply(Err(unauthorized()))
            .reply(Ok(json!({"id": 1, "user_id": "user_1"})))
            .refresh_reply(Ok(TokenPair {
                access_token: "new".into(),
                refresh_token: Some("refresh2".into()),
                token_type: None,
            }));
        let store = signed_in();
        let client = &api;
        let result = with_refresh(&api, &store, move |token| async move {
            client.me(&token).await
        })
        .await
        .unwrap();
        assert!(matches!(result, Authorized::Done(p) if p.id == 1));
        assert_eq!(api.calls(), vec!["me old", "me new"]);
        assert_eq!(api.refreshes.load(std::sync::atomic::Ordering::SeqCst), 1);
        let session = store.snapshot();
        assert_eq!(session.access_token.as_deref(), Some("new"));
        assert_eq!(session.refresh_token.as_deref(), Some("refresh2"));
    }

    #[tokio::test]
    async fn second_unauthorized_is_surfaced_not_retried() {
        let api = FakeApi::new()
            .reply(Err(unauthorized()))
            .reply(Err(unauthorized()))
            .refresh_reply(Ok(TokenPair {
                access_token: "new".into(),
                refresh_token: None,
                token_type: None,
            }));
        let store = signed_in();
        let client = &api;
        let result = with_refresh(&api, &store, move |token| async move {
            client.me(&token).await
        })
        .await
        .unwrap();
        assert!(matches!(result, Authorized::Failed(_)));
        assert_eq!(api.call_count(), 2);
        assert_eq!(store.snapshot().refresh_token.as_deref(), Some("refresh"));
    }

    #[tokio::test]
    async fn failed_refresh_expires_session() {
        let api = FakeApi::new().reply(Err(unauthorized()));
        let store = signed_in();
        let client = &api;
        let result = with_refresh(&api, &store, move |token| async move {
            client.me(&token).await
        })
        .await
        .unwrap();
        assert!(matches!(result, Authorized::Expired));
        assert_eq!(api.call_count(), 1);
        assert!(!store.snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn other_failures_do_not_refresh() {
        let api = FakeApi::new().reply(Err(ApiError::http(
            "me",
            500,
            Envelope::with_detail("Internal Server Error"),
        )));
        let store = signed_in();
        let client = &api;
        let result = with_refresh(&api, &store, move |token| async move {
            client.me(&token).await
        })
        .await
        .unwrap();
        assert!(matches!(result, Authorized::Failed(_)));
        assert_eq!(api.refreshes.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_token_is_signed_out_without_request() {
        let api = FakeApi::new();
        let store = MemorySessionStore::default();
        let client = &api;
        let result = with_refresh(&api, &store, move |token| async move {
            client.me(&token).await
        })
        .await
        .unwrap();
        assert!(matches!(result, Authorized::SignedOut));
        assert_eq!(api.call_count(), 0);
    }
}
