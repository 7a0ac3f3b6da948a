use crate::helpers::{
    create_default_leave, get_json_response_body, line_id_str, TestApp,
    LEAVE_DATE,
};
use serde_json::json;
use test_context::test_context;

#[test_context(TestApp)]
#[tokio::test]
async fn should_assign_and_confirm_a_half_shift(app: &mut TestApp) {
    // Six on create, then five cancellation notices once the slot is
    // confirmed; only the confirmed member is left out.
    app.expect_pushes(11).await;
    create_default_leave(app).await;

    let response = app
        .put_leave(&json!({
            "date": LEAVE_DATE,
            "name": "Liu Yan",
            "slot": "firstHalf",
            "member": {"name": "Lee Shan"},
            "lineUserId": line_id_str(5)
        }))
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let response_body = get_json_response_body(response).await;
    assert_eq!(
        response_body["record"]["fullDayOvertime"],
        json!({
            "type": "half-shift",
            "firstHalfMember": {"name": "Lee Shan", "team": "D", "confirmed": false}
        })
    );
    assert_eq!(response_body["notifications"], json!({}));

    let response = app
        .put_leave(&json!({
            "date": LEAVE_DATE,
            "name": "Liu Yan",
            "slot": "firstHalf",
            "confirm": true,
            "lineUserId": line_id_str(1)
        }))
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let response_body = get_json_response_body(response).await;
    assert_eq!(
        response_body["record"]["fullDayOvertime"]["firstHalfMember"]["confirmed"],
        true
    );
    // The second half is still open.
    assert_eq!(response_body["record"]["confirmed"], false);
    assert_eq!(
        response_body["notifications"]["cancellation"],
        json!({"successCount": 5, "failedCount": 0, "excludedCount": 1})
    );

    let messages = app.pushed_messages().await;
    let leader = messages.get(&line_id_str(5)).expect("Lee Shan notified");
    assert!(!leader.iter().any(|t| t.starts_with("Overtime filled")));
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_not_broadcast_twice_for_a_confirmed_slot(app: &mut TestApp) {
    app.expect_pushes(11).await;
    create_default_leave(app).await;

    let assign_and_confirm = json!({
        "date": LEAVE_DATE,
        "name": "Liu Yan",
        "slot": "fullShift",
        "member": {"name": "Cheng Yu", "confirmed": true}
    });
    let response = app.put_leave(&assign_and_confirm).await;
    assert_eq!(response.status().as_u16(), 200);
    let response_body = get_json_response_body(response).await;
    assert_eq!(response_body["record"]["confirmed"], true);
    assert_eq!(
        response_body["notifications"]["cancellation"]["excludedCount"],
        1
    );

    let response = app
        .put_leave(&json!({
            "date": LEAVE_DATE,
            "name": "Liu Yan",
            "confirm": true
        }))
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let response_body = get_json_response_body(response).await;
    assert_eq!(response_body["notifications"], json!({}));
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_record_proxy_assignment(app: &mut TestApp) {
    // Six on create plus the direct notice to the assigned member.
    app.expect_pushes(7).await;
    create_default_leave(app).await;

    let response = app
        .put_leave(&json!({
            "date": LEAVE_DATE,
            "name": "Liu Yan",
            "slot": "secondHalf",
            "member": {"name": "Chou Ping"},
            "lineUserId": line_id_str(5),
            "isProxy": true
        }))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let response_body = get_json_response_body(response).await;
    assert_eq!(
        response_body["record"]["fullDayOvertime"]["secondHalfMember"]["proxyRequest"]
            ["proxyByName"],
        "Lee Shan"
    );
    assert_eq!(response_body["notifications"]["proxyNotified"], true);
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_clear_overtime_and_notify_everyone_else(app: &mut TestApp) {
    app.expect_pushes(11).await;
    create_default_leave(app).await;

    let response = app
        .put_leave(&json!({
            "date": LEAVE_DATE,
            "name": "Liu Yan",
            "clearOvertime": true
        }))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let response_body = get_json_response_body(response).await;
    assert!(response_body["record"].get("fullDayOvertime").is_none());
    assert_eq!(
        response_body["notifications"]["cancellation"],
        json!({"successCount": 5, "failedCount": 0, "excludedCount": 1})
    );
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_reject_invalid_updates(app: &mut TestApp) {
    app.expect_pushes(6).await;
    create_default_leave(app).await;

    let bad_requests = [
        // Self-assignment.
        json!({
            "date": LEAVE_DATE,
            "name": "Liu Yan",
            "slot": "fullShift",
            "member": {"name": "Liu Yan"}
        }),
        // No operation.
        json!({"date": LEAVE_DATE, "name": "Liu Yan"}),
        // Slot without member.
        json!({"date": LEAVE_DATE, "name": "Liu Yan", "slot": "firstHalf"}),
        // Custom overtime on a full-day leave.
        json!({
            "date": LEAVE_DATE,
            "name": "Liu Yan",
            "customOvertime": {"name": "Lee Shan", "startTime": "08:00", "endTime": "12:00"}
        }),
        // Half-shift confirmation without a slot.
        json!({"date": LEAVE_DATE, "name": "Liu Yan", "confirm": true}),
    ];
    for body in bad_requests.iter() {
        let response = app.put_leave(body).await;
        assert_eq!(response.status().as_u16(), 400, "Failed for input: {body}");
    }

    let response = app
        .put_leave(&json!({
            "date": LEAVE_DATE,
            "name": "Liu Yan",
            "slot": "firstHalf",
            "confirm": true
        }))
        .await;
    assert_eq!(response.status().as_u16(), 404);

    let response = app
        .put_leave(&json!({
            "date": "2025-04-04",
            "name": "Liu Yan",
            "clearOvertime": true
        }))
        .await;
    assert_eq!(response.status().as_u16(), 404);
}
