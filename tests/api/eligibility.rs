use crate::helpers::{get_json_response_body, TestApp};
use serde_json::json;
use test_context::test_context;

fn check(name: &str, team: &str, role: &str, date: &str) -> serde_json::Value {
    json!({
        "candidate": {"name": name, "team": team, "role": role},
        "request": {"requesterName": "Liu Yan", "requesterTeam": "B", "date": date}
    })
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_explain_each_decision(app: &mut TestApp) {
    let test_cases = [
        (
            check("Lin Mei", "A", "member", "2025-04-01"),
            json!({
                "eligible": false,
                "reason": "Team A is on long rest and cannot take overtime on a Tuesday"
            }),
        ),
        (
            check("Lee Shan", "D", "leader", "2025-04-03"),
            json!({
                "eligible": true,
                "reason": "Team D is on long rest and is the priority team to cover Team B"
            }),
        ),
        (
            check("Chang Hao", "B", "leader", "2025-04-03"),
            json!({
                "eligible": false,
                "reason": "Team B is the requester's own team"
            }),
        ),
        (
            check("Cheng Yu", "C", "member", "2025-04-02"),
            json!({
                "eligible": true,
                "reason": "Team C is on short rest and can cover Team B"
            }),
        ),
    ];

    for (body, expected) in test_cases.iter() {
        let response = app.post_eligibility(body).await;
        assert_eq!(response.status().as_u16(), 200, "Failed for {body}");
        assert_eq!(&get_json_response_body(response).await, expected);
    }
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_return_422_for_malformed_input(app: &mut TestApp) {
    let response = app
        .post_eligibility(&json!({
            "candidate": {"name": "Lin Mei", "team": "E", "role": "member"},
            "request": {"requesterName": "Liu Yan", "requesterTeam": "B", "date": "2025-04-03"}
        }))
        .await;

    assert_eq!(response.status().as_u16(), 422);
}
