use super::validation::is_email;
use super::{failure_text, with_refresh, AuthApi, Authorized, FlowError, Outcome};
use crate::api::models::{ProfileUpdate, UserProfile};
use crate::session::SessionStore;

fn cache(store: &dyn SessionStore, profile: &UserProfile) -> Result<(), FlowError> {
    store.update(&mut |s| s.user = Some(profile.clone()))?;
    Ok(())
}

pub async fn show_profile<A: AuthApi>(
    api: &A,
    store: &dyn SessionStore,
) -> Result<Outcome, FlowError> {
    let client = api;
    let result = with_refresh(api, store, move |token| async move {
        client.me(&token).await
    })
    .await?;

    Ok(match result {
        Authorized::Done(profile) => {
            cache(store, &profile)?;
            Outcome::success("User details fetched successfully.").with_profile(profile)
        }
        Authorized::Failed(e) => Outcome::error(failure_text(
            &e,
            "Failed to fetch user details. Please try again.",
        )),
        Authorized::Expired => Outcome::session_expired(),
        Authorized::SignedOut => Outcome::signed_out(),
    })
}

pub async fn update_profile<A: AuthApi>(
    api: &A,
    store: &dyn SessionStore,
    update: &ProfileUpdate,
) -> Result<Outcome, FlowError> {
    let mut invalid = Outcome::error("Please correct the highlighted fields.");
    if update.name.trim().is_empty() {
        invalid = invalid.field_error("name", "Name is required");
    }
    if !is_email(update.email.trim()) {
        invalid = invalid.field_error("email", "Invalid email format");
    }
    if update.image.as_os_str().is_empty() {
        invalid = invalid.field_error("profileImage", "Profile image is required");
    } else if !update.image.is_file() {
        invalid = invalid.field_error(
            "profileImage",
            format!("Profile image {} not found", update.image.display()),
        );
    }
    if !invalid.field_errors.is_empty() {
        return Ok(invalid);
    }

    let client = api;
    let result = with_refresh(api, store, move |token| async move {
        client.update_me(&token, update).await
    })
    .await?;

    Ok(match result {
        Authorized::Done(profile) => {
            cache(store, &profile)?;
            log::info!("profile {} updated", profile.user_id);
            Outcome::success("User details updated successfully.").with_profile(profile)
        }
        Authorized::Failed(e) => Outcome::error(failure_text(
            &e,
            "Failed to update user details. Please try again.",
        )),
        Authorized::Expired => Outcome::session_expired(),
        Authorized::SignedOut => Outcome::signed_out(),
    })
}
