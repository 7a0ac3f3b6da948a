use crate::helpers::{create_default_leave, get_json_response_body, TestApp};
use serde_json::json;
use test_context::test_context;

#[test_context(TestApp)]
#[tokio::test]
async fn should_list_open_overtime_for_a_member(app: &mut TestApp) {
    app.expect_pushes(6).await;
    create_default_leave(app).await;

    let response = app.get_opportunities(&[("name", "Lee Shan")]).await;

    assert_eq!(response.status().as_u16(), 200);
    let response_body = get_json_response_body(response).await;
    assert_eq!(response_body["from"], "2025-04-03");
    assert_eq!(response_body["days"], 7);
    let opportunities =
        response_body["opportunities"].as_array().expect("array");
    assert_eq!(opportunities.len(), 1);
    assert_eq!(opportunities[0]["requesterName"], "Liu Yan");
    assert_eq!(
        opportunities[0]["overtime"],
        "half shift (first or second half)"
    );
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_hide_opportunities_from_the_requesters_team(
    app: &mut TestApp,
) {
    app.expect_pushes(6).await;
    create_default_leave(app).await;

    for name in ["Liu Yan", "Chang Hao"] {
        let response = app.get_opportunities(&[("name", name)]).await;
        let response_body = get_json_response_body(response).await;
        assert_eq!(response_body["opportunities"], json!([]), "{name}");
    }
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_return_400_for_bad_window(app: &mut TestApp) {
    for days in ["0", "32"] {
        let response = app
            .get_opportunities(&[("name", "Lee Shan"), ("days", days)])
            .await;
        assert_eq!(response.status().as_u16(), 400, "days={days}");
    }
}
