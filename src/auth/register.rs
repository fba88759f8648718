use std::time::Duration;

use super::validation::SignUpForm;
use super::{AuthApi, FlowError, Outcome, Route, NETWORK_ERROR, REDIRECT_DELAY};
use crate::api::ApiError;
use crate::session::SessionStore;

const ALREADY_ACTIVE: &str = "User is already active";

pub async fn sign_up<A: AuthApi>(
    api: &A,
    store: &dyn SessionStore,
    form: &SignUpForm,
) -> Result<Outcome, FlowError> {
    let errors = form.validate();
    if !errors.is_empty() {
        let mut outcome = Outcome::error("Please correct the highlighted fields.");
        outcome.field_errors = errors;
        return Ok(outcome);
    }

    let user = match api.register(&form.to_request()).await {
        Ok(user) => user,
        Err(e) if e.is_transport() => return Ok(Outcome::error(NETWORK_ERROR)),
        Err(e) => {
            let message = e.message().unwrap_or_default();
            let lower = message.to_lowercase();
            let outcome = if lower.contains("email") && lower.contains("exist") {
                Outcome::error("Registration failed. Please try again.")
                    .field_error("email", "Email already exists")
            } else if lower.contains("mobile") && lower.contains("exist") {
                Outcome::error("Registration failed. Please try again.")
                    .field_error("mobile", "Mobile number already exists")
            } else if matches!(e, ApiError::MissingData { .. }) {
                Outcome::error("User registration failed. Please try again.")
            } else if message.is_empty() {
                Outcome::error("Registration failed. Please try again.")
            } else {
                Outcome::error(message)
            };
            return Ok(outcome);
        }
    };

    log::info!("registered account {} awaiting OTP", user.user_id);
    store.update(&mut |s| s.pending_user_id = Some(user.id))?;
    Ok(
        Outcome::success("User registered successfully. OTP sent to your email.")
            .redirect(Route::VerifyOtp, Duration::ZERO),
    )
}

fn pending_id(store: &dyn SessionStore, id: Option<i64>) -> Result<Option<i64>, FlowError> {
    Ok(id.or(store.load()?.pending_user_id))
}

fn already_active(store: &dyn SessionStore) -> Result<Outcome, FlowError> {
    store.update(&mut |s| s.pending_user_id = None)?;
    Ok(
        Outcome::success("User is already active. Redirecting to login...")
            .redirect(Route::SignIn, REDIRECT_DELAY),
    )
}

/// Verifies the OTP for `id`, or for the account registered last.
pub async fn verify_otp<A: AuthApi>(
    api: &A,
    store: &dyn SessionStore,
    id: Option<i64>,
    otp: &str,
) -> Result<Outcome, FlowError> {
    let Some(id) = pending_id(store, id)? else {
        return Ok(Outcome::error(
            "User ID not found. Sign up first or pass the account id.",
        ));
    };
    let otp = otp.trim();
    if otp.is_empty() {
        return Ok(Outcome::error("Please enter the OTP."));
    }

    match api.verify_otp(id, otp).await {
        Ok(_) => {
            store.update(&mut |s| s.pending_user_id = None)?;
            Ok(Outcome::success("OTP verified successfully!")
                .redirect(Route::SignIn, REDIRECT_DELAY))
        }
        Err(e) if e.is_transport() => Ok(Outcome::error(
            "An error occurred while verifying OTP. Please try again.",
        )),
        Err(e) => match e.status() {
            Some(404) => Ok(Outcome::error(
                "User not found. Please check the ID and try again.",
            )),
            Some(400) if e.detail() == Some(ALREADY_ACTIVE) => already_active(store),
            Some(400) => Ok(Outcome::error("Invalid OTP. Please check and try again.")),
            Some(500) => Ok(Outcome::error("Server error. Please try again later.")),
            _ => Ok(Outcome::error(
                e.message()
                    .unwrap_or_else(|| "OTP verification failed.".to_string()),
            )),
        },
    }
}

pub async fn resend_otp<A: AuthApi>(
    api: &A,
    store: &dyn SessionStore,
    id: Option<i64>,
) -> Result<Outcome, FlowError> {
    let Some(id) = pending_id(store, id)? else {
        return Ok(Outcome::error(
            "User ID not found. Sign up first or pass the account id.",
        ));
    };

    match api.resend_otp(id).await {
        Ok(_) => Ok(Outcome::success("OTP resent successfully!")),
        Err(e) if e.is_transport() => Ok(Outcome::error(
            "An error occurred while resending OTP. Please try again.",
        )),
        Err(e) if e.status() == Some(400) && e.detail() == Some(ALREADY_ACTIVE) => {
            already_active(store)
        }
        Err(e) => Ok(Outcome::error(e.message().unwrap_or_else(|| {
            "Failed to resend OTP. Please try again.".to_string()
        }))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::Envelope;
    use crate::auth::fake::FakeApi;
    use crate::auth::Tone;
    use crate::session::{MemorySessionStore, Session};
    use serde_json::json;

    fn form() -> SignUpForm {
        SignUpForm {
            username: "warden".into(),
            email: "warden@example.com".into(),
            mobile: "9876543210".into(),
            password: "pw".into(),
            confirm_password: "pw".into(),
            user_role: "Admin".into(),
            agreed_to_terms: true,
        }
    }

    fn pending(id: i64) -> MemorySessionStore {
        MemorySessionStore::new(Session {
            pending_user_id: Some(id),
            ..Session::default()
        })
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_the_api() {
        let api = FakeApi::new();
        let store = MemorySessionStore::default();
        let outcome = sign_up(&api, &store, &SignUpForm::default()).await.unwrap();
        assert!(!outcome.is_success());
        assert!(outcome.field_errors.contains_key("username"));
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn registration_stores_pending_id() {
        let api = FakeApi::new().reply(Ok(json!({"id": 17, "user_id": "user_17"})));
        let store = MemorySessionStore::default();
        let outcome = sign_up(&api, &store, &form()).await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.redirect.map(|r| r.route), Some(Route::VerifyOtp));
        assert_eq!(store.snapshot().pending_user_id, Some(17));
    }

    #[tokio::test]
    async fn duplicate_email_becomes_field_error() {
        let api = FakeApi::new().reply(Err(ApiError::http(
            "register",
            400,
            Envelope::with_detail("Email already exists"),
        )));
        let store = MemorySessionStore::default();
        let outcome = sign_up(&api, &store, &form()).await.unwrap();
        assert_eq!(
            outcome.field_errors.get("email").map(String::as_str),
            Some("Email already exists")
        );
        assert_eq!(store.snapshot().pending_user_id, None);
    }

    #[tokio::test]
    async fn network_failure_is_generic() {
        let api = FakeApi::new().reply(Err(ApiError::transport("register", "refused")));
        let outcome = sign_up(&api, &MemorySessionStore::default(), &form())
            .await
            .unwrap();
        assert_eq!(outcome.text(), Some(NETWORK_ERROR));
    }

    #[tokio::test]
    async fn verified_otp_redirects_to_sign_in_after_delay() {
        let api = FakeApi::new().reply(Ok(json!({
            "status_code": 200,
            "message": "User verified successfully and activated."
        })));
        let store = pending(5);
        let outcome = verify_otp(&api, &store, None, "123456").await.unwrap();
        assert_eq!(outcome.notice.as_ref().map(|n| n.tone), Some(Tone::Success));
        assert_eq!(outcome.text(), Some("OTP verified successfully!"));
        let redirect = outcome.redirect.unwrap();
        assert_eq!(redirect.route, Route::SignIn);
        assert_eq!(redirect.after, REDIRECT_DELAY);
        assert_eq!(api.calls(), vec!["verify-otp 5 123456"]);
        assert_eq!(store.snapshot().pending_user_id, None);
    }

    #[tokio::test]
    async fn verify_maps_status_codes() {
        let cases = [
            (404, "User not found", "User not found. Please check the ID and try again."),
            (400, "Invalid OTP", "Invalid OTP. Please check and try again."),
            (500, "boom", "Server error. Please try again later."),
        ];
        for (status, detail, expected) in cases {
            let api = FakeApi::new().reply(Err(ApiError::http(
                "verify-otp",
                status,
                Envelope::with_detail(detail),
            )));
            let store = pending(5);
            let outcome = verify_otp(&api, &store, None, "000000").await.unwrap();
            assert_eq!(outcome.text(), Some(expected));
            assert!(outcome.redirect.is_none());
            assert_eq!(store.snapshot().pending_user_id, Some(5));
        }
    }

    #[tokio::test]
    async fn already_active_short_circuits_to_success() {
        let api = FakeApi::new().reply(Err(ApiError::http(
            "resend-otp",
            400,
            Envelope::with_detail(ALREADY_ACTIVE),
        )));
        let store = pending(9);
        let outcome = resend_otp(&api, &store, None).await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.redirect.map(|r| r.route), Some(Route::SignIn));
        assert_eq!(store.snapshot().pending_user_id, None);
    }

    #[tokio::test]
    async fn missing_pending_id_sends_nothing() {
        let api = FakeApi::new();
        let outcome = verify_otp(&api, &MemorySessionStore::default(), None, "123456")
            .await
            .unwrap();
        assert!(!outcome.is_success());
        assert_eq!(api.call_count(), 0);
    }
}
