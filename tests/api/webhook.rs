use crate::helpers::{
    get_json_response_body, line_id, line_id_str, TestApp, ADMIN,
};
use rota_overtime::domain::{
    IdentitySelectionStore, IdentityStep, MemberName, ProfileStore,
    ProfileStoreError, Team,
};
use serde_json::{json, Value};
use test_context::test_context;

fn text_event(from: &str, text: &str) -> Value {
    json!({
        "events": [{
            "type": "message",
            "source": {"type": "user", "userId": from},
            "message": {"type": "text", "id": "1", "text": text}
        }]
    })
}

async fn send(app: &TestApp, from: &str, text: &str) {
    let response = app.post_webhook(&text_event(from, text)).await;
    assert_eq!(response.status().as_u16(), 200, "Failed for {text:?}");
    assert_eq!(
        get_json_response_body(response).await,
        json!({"handled": 1})
    );
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_bind_a_new_account_through_conversation(app: &mut TestApp) {
    app.expect_pushes(4).await;
    let newcomer = line_id_str(7);

    send(app, &newcomer, "register").await;
    send(app, &newcomer, "Wang Jun").await;
    send(app, &newcomer, "yes").await;
    send(app, &newcomer, "status").await;

    let profile = app
        .profile_store
        .read()
        .await
        .get_profile_by_member_name(&MemberName::parse("Wang Jun").unwrap())
        .await
        .expect("profile created");
    assert_eq!(profile.line_user_id, line_id(7));
    assert_eq!(profile.team, Team::A);
    assert!(profile.notification_enabled);

    let selection = app
        .identity_selection_store
        .read()
        .await
        .get_state(&line_id(7))
        .await
        .expect("selection kept");
    assert_eq!(selection.step, IdentityStep::Completed);

    let replies = app.pushed_messages().await;
    let replies = replies.get(&newcomer).expect("replies sent");
    assert_eq!(
        replies[1],
        "You selected Wang Jun (Team A, member). Reply \"yes\" to confirm or \"no\" to choose again. This cannot be changed later."
    );
    assert!(replies[2].starts_with("Registration complete. You are Wang Jun (Team A)."));
    assert!(replies[3].ends_with("Today (2025-04-03) Team A is on the early day shift."));
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_refuse_a_name_that_is_already_bound(app: &mut TestApp) {
    app.expect_pushes(2).await;
    let newcomer = line_id_str(7);

    send(app, &newcomer, "register").await;
    send(app, &newcomer, "Liu Yan").await;

    let replies = app.pushed_messages().await;
    assert_eq!(
        replies.get(&newcomer).and_then(|r| r.last()).map(String::as_str),
        Some("Liu Yan is already linked to another LINE account.")
    );
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_let_only_admins_reset_bindings(app: &mut TestApp) {
    app.expect_pushes(2).await;

    send(app, &line_id_str(3), "admin reset Liu Yan").await;
    assert!(app
        .profile_store
        .read()
        .await
        .get_profile_by_line_id(&line_id(1))
        .await
        .is_ok());

    send(app, &line_id_str(ADMIN), "admin reset Liu Yan").await;
    assert_eq!(
        app.profile_store
            .read()
            .await
            .get_profile_by_line_id(&line_id(1))
            .await,
        Err(ProfileStoreError::ProfileNotFound)
    );
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_toggle_notifications(app: &mut TestApp) {
    app.expect_pushes(1).await;

    send(app, &line_id_str(4), "notifications off").await;

    let profile = app
        .profile_store
        .read()
        .await
        .get_profile_by_line_id(&line_id(4))
        .await
        .expect("profile exists");
    assert!(!profile.notification_enabled);
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_ignore_events_that_are_not_text_messages(app: &mut TestApp) {
    app.expect_pushes(0).await;

    let response = app
        .post_webhook(&json!({
            "destination": "Uxxxxxxxx",
            "events": [
                {"type": "follow", "source": {"type": "user", "userId": line_id_str(7)}},
                {
                    "type": "message",
                    "source": {"type": "user", "userId": line_id_str(7)},
                    "message": {"type": "sticker", "id": "2"}
                },
                {
                    "type": "message",
                    "source": {"type": "user", "userId": "not-a-line-id"},
                    "message": {"type": "text", "id": "3", "text": "help"}
                }
            ]
        }))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        get_json_response_body(response).await,
        json!({"handled": 0})
    );
}
