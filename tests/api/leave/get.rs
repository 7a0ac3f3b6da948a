use crate::helpers::{
    create_default_leave, get_json_response_body, TestApp, LEAVE_DATE,
};
use test_context::test_context;

#[test_context(TestApp)]
#[tokio::test]
async fn should_list_records_by_date_and_range(app: &mut TestApp) {
    app.expect_pushes(6).await;
    create_default_leave(app).await;

    let response = app.get_leave(&[("date", LEAVE_DATE)]).await;
    assert_eq!(response.status().as_u16(), 200);
    let response_body = get_json_response_body(response).await;
    assert_eq!(response_body["records"].as_array().map(Vec::len), Some(1));
    assert_eq!(response_body["records"][0]["requesterName"], "Liu Yan");

    let response = app
        .get_leave(&[("from", "2025-04-04"), ("to", "2025-04-10")])
        .await;
    let response_body = get_json_response_body(response).await;
    assert_eq!(response_body["records"].as_array().map(Vec::len), Some(0));
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_return_400_for_bad_queries(app: &mut TestApp) {
    app.expect_pushes(0).await;

    let test_cases: [&[(&str, &str)]; 3] = [
        &[],
        &[("from", "2025-04-03")],
        &[("from", "2025-04-10"), ("to", "2025-04-03")],
    ];
    for query in test_cases {
        let response = app.get_leave(query).await;
        assert_eq!(response.status().as_u16(), 400, "Failed for {query:?}");
    }
}
