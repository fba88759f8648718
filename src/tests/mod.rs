use serde_json::json;

use crate::api::models::Envelope;
use crate::api::ApiError;
use crate::auth::fake::FakeApi;
use crate::auth::{password, register, Route, REDIRECT_DELAY};
use crate::screens::{Hostel, Screen, ScreenState, ScreenTable};
use crate::session::{FileSessionStore, Session, SessionStore};
use crate::table::paginator::PageSize;
use crate::table::view::Confirm;
use crate::table::Record;

struct Answer {
    reply: bool,
    asked: Vec<String>,
}

impl Confirm for Answer {
    fn confirm(&mut self, prompt: &str) -> bool {
        self.asked.push(prompt.to_string());
        self.reply
    }
}

#[test]
fn add_hostel_z_unchecked_appends_inactive_record() {
    let mut state = ScreenState::<Hostel>::from_fixture();
    state.open_add().unwrap();
    state.set_field("hostelName", "Hostel Z").unwrap();
    let id = state.submit().unwrap();

    let records = state.table().store().records();
    assert_eq!(records.len(), 11);
    let last = &records[10];
    assert_eq!(last.hostel_name, "Hostel Z");
    assert!(!last.is_active);
    assert_eq!(last.id, id);
    assert_eq!(records.iter().filter(|h| h.id == id).count(), 1);
}

#[test]
fn delete_requires_confirmation() {
    let mut state = ScreenState::<Hostel>::from_fixture();

    let mut decline = Answer {
        reply: false,
        asked: Vec::new(),
    };
    assert!(!state.delete(3, &mut decline).unwrap());
    assert_eq!(state.table().store().len(), 10);
    assert_eq!(
        decline.asked,
        vec!["Are you sure you want to delete this hostel?"]
    );

    let mut accept = Answer {
        reply: true,
        asked: Vec::new(),
    };
    assert!(state.delete(3, &mut accept).unwrap());
    let records = state.table().store().records();
    assert_eq!(records.len(), 9);
    assert!(records.iter().all(|h| h.id() != 3));
}

#[test]
fn ids_are_not_reused_after_delete() {
    let mut state = ScreenState::<Hostel>::from_fixture();
    state.delete(10, &mut |_: &str| true).unwrap();
    state.open_add().unwrap();
    state.set_field("hostelName", "Hostel K").unwrap();
    assert_eq!(state.submit().unwrap(), 11);
}

#[test]
fn pages_concatenate_to_the_filtered_sequence() {
    for screen in Screen::ALL {
        for size in [5, 10, 20] {
            let mut table = screen.open();
            table.set_page_size(PageSize::new(size).unwrap());
            let page = table.render();
            let expected = page.filtered;
            let total_pages = page.total_pages;
            assert_eq!(total_pages, expected.div_ceil(size).max(1));

            let mut seen = Vec::new();
            for n in 1..=total_pages {
                table.go_to_page(n).unwrap();
                seen.extend(table.render().rows.into_iter().map(|r| r.id));
            }
            let mut unique = seen.clone();
            unique.sort_unstable();
            unique.dedup();
            assert_eq!(seen.len(), expected, "{} size {size}", screen.name());
            assert_eq!(unique.len(), expected);
            assert!(table.go_to_page(total_pages + 1).is_err());
        }
    }
}

#[test]
fn first_and_last_page_disable_controls() {
    let mut table = Screen::Floors.open();
    assert!(!table.render().controls.previous_enabled);
    assert!(table.previous_page().is_err());
    table.go_to_page(3).unwrap();
    let page = table.render();
    assert!(!page.controls.next_enabled);
    assert!(page.controls.previous_enabled);
    assert!(table.next_page().is_err());
    table.set_page_size(PageSize::new(10).unwrap());
    assert_eq!(table.render().page, 1);
}

#[test]
fn renaming_out_of_filter_on_last_page_stays_in_range() {
    let mut table = Screen::Hostels.open();
    table.open_add().unwrap();
    table.set_field("hostelName", "Hostel Z").unwrap();
    let id = table.submit().unwrap();

    table.set_filter("hostel");
    table.go_to_page(3).unwrap();
    table.open_edit(id).unwrap();
    table.set_field("hostelName", "Annex").unwrap();
    table.submit().unwrap();

    let page = table.render();
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.page, 2);
    assert_eq!(page.rows.len(), 5);
    assert!(!page.controls.next_enabled);
    assert!(page.controls.previous_enabled);
}

#[test]
fn filtering_twice_changes_nothing() {
    let mut table = Screen::Rooms.open();
    table.set_filter("10");
    let once = table.render();
    table.set_filter("10");
    assert_eq!(table.render(), once);
}

#[test]
fn envelope_message_falls_back_to_nested_detail() {
    let env = Envelope::default().with_data(json!({"detail": "Hostel not found"}));
    assert_eq!(env.text().as_deref(), Some("Hostel not found"));
    let env = Envelope::with_message("ok").with_extra("email", json!("a@b.co"));
    assert_eq!(env.field_as::<String>("email").as_deref(), Some("a@b.co"));
}

#[tokio::test]
async fn registration_and_otp_persist_through_session_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(dir.path().join("session.json"));
    store
        .save(&Session {
            pending_user_id: Some(21),
            ..Session::default()
        })
        .unwrap();

    let api = FakeApi::new().reply(Ok(json!({"status_code": 200})));
    let outcome = register::verify_otp(&api, &store, None, "123456")
        .await
        .unwrap();
    assert_eq!(outcome.text(), Some("OTP verified successfully!"));
    let redirect = outcome.redirect.unwrap();
    assert_eq!(redirect.route, Route::SignIn);
    assert_eq!(redirect.after, REDIRECT_DELAY);
    assert_eq!(api.calls(), vec!["verify-otp 21 123456"]);
    assert_eq!(store.load().unwrap().pending_user_id, None);
}

#[tokio::test]
async fn reset_with_mismatched_passwords_issues_no_request() {
    let api = FakeApi::new().reply(Err(ApiError::http(
        "reset-password",
        500,
        Envelope::default(),
    )));
    let store = crate::session::MemorySessionStore::new(Session {
        pending_identifier: Some("warden@example.com".into()),
        ..Session::default()
    });
    let outcome = password::reset_password(&api, &store, None, "123456", "first", "second")
        .await
        .unwrap();
    assert_eq!(
        outcome.text(),
        Some("New password and confirm password do not match.")
    );
    assert!(outcome.redirect.is_none());
    assert_eq!(api.call_count(), 0);
}
