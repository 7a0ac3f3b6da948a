use crate::helpers::{
    create_default_leave, get_json_response_body, line_id_str, TestApp,
    LEAVE_DATE,
};
use serde_json::json;
use test_context::test_context;

#[test_context(TestApp)]
#[tokio::test]
async fn should_cancel_leave_and_notify_everyone_but_the_requester(
    app: &mut TestApp,
) {
    app.expect_pushes(11).await;
    create_default_leave(app).await;

    let requester = line_id_str(1);
    let response = app
        .delete_leave(&[
            ("date", LEAVE_DATE),
            ("name", "Liu Yan"),
            ("lineUserId", &requester),
        ])
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let response_body = get_json_response_body(response).await;
    assert_eq!(
        response_body,
        json!({
            "date": LEAVE_DATE,
            "name": "Liu Yan",
            "successCount": 5,
            "failedCount": 0,
            "excludedCount": 1
        })
    );

    let response = app.get_leave(&[("date", LEAVE_DATE)]).await;
    let response_body = get_json_response_body(response).await;
    assert_eq!(response_body["records"], json!([]));
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_exclude_requester_when_cancelling_a_confirmed_full_shift(
    app: &mut TestApp,
) {
    // Six on create, five when the full shift is confirmed, five on cancel.
    app.expect_pushes(16).await;
    create_default_leave(app).await;

    let response = app
        .put_leave(&json!({
            "date": LEAVE_DATE,
            "name": "Liu Yan",
            "slot": "fullShift",
            "member": {"name": "Cheng Yu", "confirmed": true}
        }))
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let response_body = get_json_response_body(response).await;
    assert_eq!(response_body["record"]["confirmed"], true);

    let requester = line_id_str(1);
    let response = app
        .delete_leave(&[
            ("date", LEAVE_DATE),
            ("name", "Liu Yan"),
            ("lineUserId", &requester),
        ])
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let response_body = get_json_response_body(response).await;
    assert_eq!(response_body["successCount"], 5);
    assert_eq!(response_body["failedCount"], 0);
    assert_eq!(response_body["excludedCount"], 1);

    let messages = app.pushed_messages().await;
    let cancelled = |texts: &Vec<String>| {
        texts.iter().any(|t| t.starts_with("Leave cancelled"))
    };
    assert!(!messages.get(&requester).is_some_and(cancelled));
    assert!(messages.get(&line_id_str(4)).is_some_and(cancelled));
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_notify_requester_of_proxy_cancellation(app: &mut TestApp) {
    // Six on create, the proxy notice, then five cancellation notices.
    app.expect_pushes(12).await;
    create_default_leave(app).await;

    let leader = line_id_str(2);
    let response = app
        .delete_leave(&[
            ("date", LEAVE_DATE),
            ("name", "Liu Yan"),
            ("lineUserId", &leader),
            ("isProxy", "true"),
        ])
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let messages = app.pushed_messages().await;
    assert!(messages
        .get(&line_id_str(1))
        .is_some_and(|texts| texts
            .contains(&String::from("Chang Hao cancelled your full day leave on 2025-04-03."))));
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_reject_cancellation_by_someone_else(app: &mut TestApp) {
    app.expect_pushes(6).await;
    create_default_leave(app).await;

    let other = line_id_str(3);
    let response = app
        .delete_leave(&[
            ("date", LEAVE_DATE),
            ("name", "Liu Yan"),
            ("lineUserId", &other),
        ])
        .await;

    assert_eq!(response.status().as_u16(), 403);
    let response_body = get_json_response_body(response).await;
    assert_eq!(response_body["code"], "NOT_PERMITTED");
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_return_404_for_missing_leave(app: &mut TestApp) {
    app.expect_pushes(0).await;

    let response = app
        .delete_leave(&[("date", LEAVE_DATE), ("name", "Liu Yan")])
        .await;

    assert_eq!(response.status().as_u16(), 404);
}
