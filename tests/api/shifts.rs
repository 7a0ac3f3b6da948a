use crate::helpers::{get_json_response_body, TestApp, LEAVE_DATE};
use serde_json::json;
use test_context::test_context;

#[test_context(TestApp)]
#[tokio::test]
async fn should_return_every_team_with_its_shift(app: &mut TestApp) {
    let response = app.get_shifts(&[("date", LEAVE_DATE)]).await;

    assert_eq!(response.status().as_u16(), 200);
    let response_body = get_json_response_body(response).await;

    let schema = json!({
        "type": "object",
        "required": ["date", "rosterEffectiveFrom", "teams"],
        "properties": {
            "teams": {
                "type": "array",
                "minItems": 4,
                "maxItems": 4,
                "items": {
                    "type": "object",
                    "required": ["team", "shift", "members"]
                }
            }
        }
    });
    assert!(
        jsonschema::is_valid(&schema, &response_body),
        "response does not match schema"
    );

    let shifts: Vec<(&str, &str)> = response_body["teams"]
        .as_array()
        .expect("teams array")
        .iter()
        .map(|team| {
            (
                team["team"].as_str().unwrap_or_default(),
                team["shift"].as_str().unwrap_or_default(),
            )
        })
        .collect();
    assert_eq!(
        shifts,
        [
            ("A", "day-early"),
            ("B", "day-mid"),
            ("C", "night"),
            ("D", "long-rest")
        ]
    );
    assert_eq!(
        response_body["teams"][3]["members"][0],
        json!({"name": "Lee Shan", "role": "leader"})
    );
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_default_to_today(app: &mut TestApp) {
    let response = app.get_shifts(&[]).await;

    assert_eq!(response.status().as_u16(), 200);
    let response_body = get_json_response_body(response).await;
    assert_eq!(response_body["date"], LEAVE_DATE);
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_pick_the_roster_in_effect(app: &mut TestApp) {
    let response = app.get_shifts(&[("date", "2026-01-01")]).await;

    let response_body = get_json_response_body(response).await;
    assert_eq!(response_body["rosterEffectiveFrom"], "2026-01-01");
    assert_eq!(
        response_body["teams"][1]["members"][0],
        json!({"name": "Liu Yan", "role": "leader"})
    );
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_return_400_for_bad_date(app: &mut TestApp) {
    let response = app.get_shifts(&[("date", "yesterday")]).await;

    assert_eq!(response.status().as_u16(), 400);
}
