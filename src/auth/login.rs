use std::time::Duration;

use super::{failure_text, AuthApi, FlowError, Outcome, Route};
use crate::session::SessionStore;

const LOGIN_FAILED: &str = "Login failed. Please check your credentials and try again.";

pub async fn login<A: AuthApi>(
    api: &A,
    store: &dyn SessionStore,
    username: &str,
    password: &str,
) -> Result<Outcome, FlowError> {
    if username.trim().is_empty() || password.is_empty() {
        return Ok(Outcome::error("Please enter your username and password."));
    }

    let grant = match api.login(username.trim(), password).await {
        Ok(grant) if !grant.tokens.access_token.is_empty() => grant,
        Ok(_) => return Ok(Outcome::error(LOGIN_FAILED)),
        Err(e) if e.is_transport() => return Ok(Outcome::error(failure_text(&e, LOGIN_FAILED))),
        Err(e) => {
            log::debug!("login rejected: {e}");
            return Ok(Outcome::error(LOGIN_FAILED));
        }
    };

    let session = store.update(&mut |s| {
        s.store_tokens(&grant.tokens);
        s.user = grant.user.clone();
    })?;
    log::info!("signed in as {}", username.trim());

    let text = grant
        .message
        .unwrap_or_else(|| "Login successful".to_string());
    let outcome = Outcome::success(text).redirect(Route::Dashboard, Duration::ZERO);
    Ok(match session.user {
        Some(user) => outcome.with_profile(user),
        None => outcome,
    })
}

/// Ends the session on the server and locally. A 401 from the server still
/// clears the local credentials since they are no longer valid.
pub async fn logout<A: AuthApi>(api: &A, store: &dyn SessionStore) -> Result<Outcome, FlowError> {
    let Some(token) = store.load()?.access_token else {
        return Ok(
            Outcome::info("No access token found. Redirecting to login page.")
                .redirect(Route::SignIn, Duration::ZERO),
        );
    };

    match api.logout(&token).await {
        Ok(env) => {
            store.update(&mut |s| s.sign_out())?;
            let text = env
                .text()
                .unwrap_or_else(|| "Logged out successfully".to_string());
            Ok(Outcome::success(text).redirect(Route::SignIn, Duration::ZERO))
        }
        Err(e) if e.is_unauthorized() => {
            store.update(&mut |s| s.sign_out())?;
            Ok(
                Outcome::info("Session was already invalid. Signed out locally.")
                    .redirect(Route::SignIn, Duration::ZERO),
            )
        }
        Err(e) => Ok(Outcome::error(failure_text(
            &e,
            "Logout failed. Please try again.",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::Envelope;
    use crate::api::ApiError;
    use crate::auth::fake::FakeApi;
    use crate::auth::NETWORK_ERROR;
    use crate::session::{MemorySessionStore, Session};
    use serde_json::json;

    fn signed_in() -> MemorySessionStore {
        MemorySessionStore::new(Session {
            access_token: Some("tok".into()),
            refresh_token: Some("ref".into()),
            pending_identifier: Some("warden@example.com".into()),
            ..Session::default()
        })
    }

    #[tokio::test]
    async fn login_stores_tokens_and_profile() {
        let api = FakeApi::new().reply(Ok(json!({
            "status": "success",
            "msg": "Login successful",
            "access_token": "a1",
            "refresh_token": "r1",
            "user_data": {"id": 3, "user_id": "user_3", "name": "Warden"}
        })));
        let store = MemorySessionStore::default();
        let outcome = login(&api, &store, " warden ", "pw").await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.redirect.map(|r| r.route), Some(Route::Dashboard));
        assert_eq!(outcome.profile.map(|p| p.id), Some(3));
        let session = store.snapshot();
        assert_eq!(session.access_token.as_deref(), Some("a1"));
        assert_eq!(session.refresh_token.as_deref(), Some("r1"));
        assert_eq!(api.calls(), vec!["login warden"]);
    }

    #[tokio::test]
    async fn rejected_login_is_generic() {
        let api = FakeApi::new().reply(Err(ApiError::http(
            "login",
            401,
            Envelope::with_detail("Incorrect username or password"),
        )));
        let store = MemorySessionStore::default();
        let outcome = login(&api, &store, "warden", "bad").await.unwrap();
        assert_eq!(outcome.text(), Some(LOGIN_FAILED));
        assert!(!store.snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn login_without_token_fails() {
        let api = FakeApi::new().reply(Ok(json!({"status": "success"})));
        let outcome = login(&api, &MemorySessionStore::default(), "warden", "pw")
            .await
            .unwrap();
        assert_eq!(outcome.text(), Some(LOGIN_FAILED));
    }

    #[tokio::test]
    async fn logout_without_token_redirects_immediately() {
        let api = FakeApi::new();
        let outcome = logout(&api, &MemorySessionStore::default()).await.unwrap();
        let redirect = outcome.redirect.unwrap();
        assert_eq!(redirect.route, Route::SignIn);
        assert_eq!(redirect.after, Duration::ZERO);
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn logout_clears_credentials_but_keeps_pending_state() {
        let api = FakeApi::new().reply(Ok(json!({"message": "Successfully logged out"})));
        let store = signed_in();
        let outcome = logout(&api, &store).await.unwrap();
        assert_eq!(outcome.text(), Some("Successfully logged out"));
        let session = store.snapshot();
        assert!(!session.is_authenticated());
        assert_eq!(session.refresh_token, None);
        assert_eq!(
            session.pending_identifier.as_deref(),
            Some("warden@example.com")
        );
    }

    #[tokio::test]
    async fn unauthorized_logout_still_signs_out() {
        let api = FakeApi::new().reply(Err(ApiError::http("logout", 401, Envelope::default())));
        let store = signed_in();
        logout(&api, &store).await.unwrap();
        assert!(!store.snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn failed_logout_keeps_session() {
        let api = FakeApi::new().reply(Err(ApiError::transport("logout", "connection reset")));
        let store = signed_in();
        let outcome = logout(&api, &store).await.unwrap();
        assert_eq!(outcome.text(), Some(NETWORK_ERROR));
        assert!(store.snapshot().is_authenticated());
    }
}
