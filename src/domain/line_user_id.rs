use super::ValidationError;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

lazy_static! {
    static ref LINE_USER_ID: Regex =
        Regex::new(r"^U[0-9a-f]{32}$").expect("LINE user ID regex is valid");
}

/// A LINE messaging identity (`U` followed by 32 hex digits).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LineUserId(String);

impl LineUserId {
    pub fn parse(id: &str) -> Result<Self, ValidationError> {
        let id = id.trim();
        if LINE_USER_ID.is_match(id) {
            Ok(Self(id.to_owned()))
        } else {
            Err(ValidationError::new(format!("Invalid LINE user ID: {id}")))
        }
    }
}

impl AsRef<str> for LineUserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for LineUserId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LineUserId> for String {
    fn from(id: LineUserId) -> Self {
        id.0
    }
}

#[test]
fn test_valid_line_user_ids() {
    let valid_id = "U4af4980629a0b1c2d3e4f5a6b7c8d9e0";
    let parsed = LineUserId::parse(valid_id).expect(valid_id);
    assert_eq!(parsed.as_ref(), valid_id);
}

#[test]
fn test_invalid_line_user_ids() {
    let invalid_ids = [
        "",
        "4af4980629a0b1c2d3e4f5a6b7c8d9e0",
        "U4af4980629a0b1c2d3e4f5a6b7c8d9e",
        "U4AF4980629A0B1C2D3E4F5A6B7C8D9E0",
        "C4af4980629a0b1c2d3e4f5a6b7c8d9e0",
    ];
    for invalid_id in invalid_ids {
        let error = LineUserId::parse(invalid_id).expect_err(invalid_id);
        assert!(error.as_ref().starts_with("Invalid LINE user ID"));
    }
}
