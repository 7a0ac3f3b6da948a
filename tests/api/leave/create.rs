use crate::helpers::{
    create_default_leave, get_json_response_body, line_id_str, TestApp,
    LEAVE_DATE,
};
use serde_json::json;
use test_context::test_context;

#[test_context(TestApp)]
#[tokio::test]
async fn should_return_201_and_notify_eligible_crew(app: &mut TestApp) {
    // Two suggestion pushes to team D plus four opportunity pushes.
    app.expect_pushes(6).await;

    let response_body = create_default_leave(app).await;

    let schema = json!({
        "type": "object",
        "required": ["record", "notifications"],
        "properties": {
            "record": {
                "type": "object",
                "required": ["date", "requesterName", "requesterTeam", "period", "confirmed"]
            },
            "notifications": {
                "type": "object",
                "required": ["suggestion", "opportunity"]
            }
        }
    });
    assert!(
        jsonschema::is_valid(&schema, &response_body),
        "response does not match schema"
    );

    assert_eq!(
        response_body["record"],
        json!({
            "date": LEAVE_DATE,
            "requesterName": "Liu Yan",
            "requesterTeam": "B",
            "period": "fullDay",
            "confirmed": false,
            "fullDayOvertime": {"type": "half-shift"}
        })
    );
    assert_eq!(
        response_body["notifications"],
        json!({
            "suggestion": {"successCount": 2, "failedCount": 0, "totalCandidates": 2},
            "opportunity": {"successCount": 4, "failedCount": 0, "totalCandidates": 4}
        })
    );

    let messages = app.pushed_messages().await;
    assert!(!messages.contains_key(&line_id_str(1)), "requester notified");
    assert!(!messages.contains_key(&line_id_str(2)), "same team notified");
    for n in [3, 4, 5, 6] {
        assert!(
            messages
                .get(&line_id_str(n))
                .is_some_and(|texts| texts.iter().any(|t| t.starts_with("Overtime opportunity"))),
            "no opportunity for profile {n}"
        );
    }
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_return_409_for_duplicate_leave(app: &mut TestApp) {
    app.expect_pushes(6).await;
    create_default_leave(app).await;

    let response = app
        .post_leave(&json!({
            "date": LEAVE_DATE,
            "name": "Liu Yan"
        }))
        .await;

    assert_eq!(response.status().as_u16(), 409);
    let response_body = get_json_response_body(response).await;
    assert_eq!(
        response_body["error"],
        "Leave already exists for Liu Yan on 2025-04-03"
    );
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_return_400_for_invalid_input(app: &mut TestApp) {
    app.expect_pushes(0).await;

    let test_cases = [
        json!({"date": LEAVE_DATE}),
        json!({"name": "Liu Yan"}),
        json!({"date": "03/04/2025", "name": "Liu Yan"}),
        json!({"date": LEAVE_DATE, "name": "Liu Yan", "team": "E"}),
        json!({"date": LEAVE_DATE, "name": "Nobody Known"}),
        json!({
            "date": LEAVE_DATE,
            "name": "Liu Yan",
            "period": {"startTime": "08:00", "endTime": "08:00"}
        }),
        json!({
            "date": LEAVE_DATE,
            "name": "Liu Yan",
            "fullDayOvertime": {"type": "quarter"}
        }),
        json!({"date": LEAVE_DATE, "name": "Liu Yan", "isProxy": true}),
    ];

    for test_case in test_cases.iter() {
        let response = app.post_leave(test_case).await;
        assert_eq!(
            response.status().as_u16(),
            400,
            "Failed for input: {:?}",
            test_case
        );
        let response_body = get_json_response_body(response).await;
        assert!(response_body["error"].is_string());
    }
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_return_403_for_unregistered_caller(app: &mut TestApp) {
    app.expect_pushes(0).await;

    let response = app
        .post_leave(&json!({
            "date": LEAVE_DATE,
            "name": "Liu Yan",
            "lineUserId": line_id_str(99)
        }))
        .await;

    assert_eq!(response.status().as_u16(), 403);
    let response_body = get_json_response_body(response).await;
    assert_eq!(response_body["code"], "NOT_REGISTERED");
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_return_403_when_acting_for_someone_else(app: &mut TestApp) {
    app.expect_pushes(0).await;

    let response = app
        .post_leave(&json!({
            "date": LEAVE_DATE,
            "name": "Liu Yan",
            "lineUserId": line_id_str(2)
        }))
        .await;

    assert_eq!(response.status().as_u16(), 403);
    let response_body = get_json_response_body(response).await;
    assert_eq!(response_body["code"], "NOT_PERMITTED");
    assert_eq!(response_body["error"], "Not permitted to act for Liu Yan");
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_record_and_notify_proxy_filing(app: &mut TestApp) {
    // Proxy notice, two suggestions and four opportunities.
    app.expect_pushes(7).await;

    let response = app
        .post_leave(&json!({
            "date": LEAVE_DATE,
            "name": "Liu Yan",
            "lineUserId": line_id_str(2),
            "isProxy": true
        }))
        .await;

    assert_eq!(response.status().as_u16(), 201);
    let response_body = get_json_response_body(response).await;
    assert_eq!(
        response_body["record"]["proxyRequest"],
        json!({
            "isProxy": true,
            "proxyByName": "Chang Hao",
            "proxyByLineUserId": line_id_str(2),
            "proxyByDisplayName": "Chang Hao"
        })
    );
    assert_eq!(response_body["notifications"]["proxyNotified"], true);

    let messages = app.pushed_messages().await;
    assert_eq!(
        messages.get(&line_id_str(1)),
        Some(&vec![String::from(
            "Chang Hao filed a full day leave for you on 2025-04-03."
        )])
    );
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_advertise_custom_period_hours(app: &mut TestApp) {
    app.expect_pushes(6).await;

    let response = app
        .post_leave(&json!({
            "date": LEAVE_DATE,
            "name": "Liu Yan",
            "period": {"startTime": "08:00", "endTime": "12:00"}
        }))
        .await;

    assert_eq!(response.status().as_u16(), 201);
    let response_body = get_json_response_body(response).await;
    assert_eq!(
        response_body["record"]["period"],
        json!({"startTime": "08:00", "endTime": "12:00"})
    );
    assert!(response_body["record"].get("fullDayOvertime").is_none());

    let messages = app.pushed_messages().await;
    let texts = messages.get(&line_id_str(5)).expect("team D notified");
    assert!(texts.iter().any(|t| t.contains("Needed: 08:00-12:00")));
}
