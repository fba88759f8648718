use super::validation::{is_email, is_mobile, is_otp};
use super::{
    failure_text, with_refresh, AuthApi, Authorized, FlowError, Outcome, Route, REDIRECT_DELAY,
    RESET_REDIRECT_DELAY,
};
use crate::session::SessionStore;

pub async fn forgot_password<A: AuthApi>(
    api: &A,
    store: &dyn SessionStore,
    identifier: &str,
) -> Result<Outcome, FlowError> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return Ok(Outcome::error("Please enter your email or mobile number."));
    }
    if !is_email(identifier) && !is_mobile(identifier) {
        return Ok(Outcome::error(
            "Please enter a valid email address or a 10-digit mobile number.",
        ));
    }

    let reply = match api.forgot_password(identifier).await {
        Ok(reply) => reply,
        Err(e) => {
            return Ok(Outcome::error(failure_text(
                &e,
                "Failed to send reset password email. Please try again.",
            )))
        }
    };

    match reply.email {
        Some(email) if reply.accepted => {
            store.update(&mut |s| s.pending_identifier = Some(email.clone()))?;
            let text = reply
                .message
                .unwrap_or_else(|| "Password reset email sent successfully!".to_string());
            Ok(Outcome::success(text).redirect(Route::ResetPassword, RESET_REDIRECT_DELAY))
        }
        _ => Ok(Outcome::error(
            "The email or mobile number is not registered. Please check and try again.",
        )),
    }
}

/// Completes a reset requested with [`forgot_password`]. Nothing is sent
/// until every local check passes.
pub async fn reset_password<A: AuthApi>(
    api: &A,
    store: &dyn SessionStore,
    identifier: Option<&str>,
    otp: &str,
    new_password: &str,
    confirm_password: &str,
) -> Result<Outcome, FlowError> {
    let otp = otp.trim();
    if otp.is_empty() {
        return Ok(Outcome::error("Please enter the OTP."));
    }
    if !is_otp(otp) {
        return Ok(Outcome::error("Please enter a valid 6-digit OTP."));
    }
    if new_password.is_empty() {
        return Ok(Outcome::error("Please enter your new password."));
    }
    if new_password != confirm_password {
        return Ok(Outcome::error(
            "New password and confirm password do not match.",
        ));
    }

    let identifier = match identifier {
        Some(id) => id.trim().to_string(),
        None => store.load()?.pending_identifier.unwrap_or_default(),
    };
    if identifier.is_empty() {
        return Ok(Outcome::error(
            "No password reset is pending. Request one with forgot-password first.",
        ));
    }

    match api.reset_password(&identifier, otp, new_password).await {
        Ok(env) => {
            store.update(&mut |s| s.pending_identifier = None)?;
            let text = env
                .text()
                .unwrap_or_else(|| "Password reset successfully!".to_string());
            Ok(Outcome::success(text).redirect(Route::SignIn, REDIRECT_DELAY))
        }
        Err(e) => {
            let text = match e.message().as_deref() {
                Some("Invalid OTP") => "Invalid OTP. Please check and try again.".to_string(),
                Some("Invalid email or mobile.") => {
                    "Invalid email or mobile. Please check and try again.".to_string()
                }
                _ => failure_text(&e, "Failed to reset password. Please try again."),
            };
            Ok(Outcome::error(text))
        }
    }
}

pub async fn change_password<A: AuthApi>(
    api: &A,
    store: &dyn SessionStore,
    old_password: &str,
    new_password: &str,
    confirm_password: &str,
) -> Result<Outcome, FlowError> {
    if old_password.is_empty() || new_password.is_empty() || confirm_password.is_empty() {
        return Ok(Outcome::error("Please fill in all password fields."));
    }
    if new_password != confirm_password {
        return Ok(Outcome::error(
            "New password and confirm password do not match.",
        ));
    }

    let client = api;
    let result = with_refresh(api, store, move |token| async move {
        client
            .change_password(&token, old_password, new_password)
            .await
    })
    .await?;

    Ok(match result {
        Authorized::Done(env) => Outcome::success(
            env.text()
                .unwrap_or_else(|| "Password changed successfully.".to_string()),
        ),
        Authorized::Failed(e) => Outcome::error(failure_text(
            &e,
            "Failed to change password. Please try again.",
        )),
        Authorized::Expired => Outcome::session_expired(),
        Authorized::SignedOut => Outcome::signed_out(),
    })
}
