use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct MemberName(String);

const MAX_NAME_LENGTH: usize = 64;

impl MemberName {
    pub fn parse(name: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        match name.chars().count() {
            0 => Err(ValidationError::new(
                "Member name cannot be empty".to_string(),
            )),
            x if x > MAX_NAME_LENGTH => Err(ValidationError::new(format!(
                "Max name length is {MAX_NAME_LENGTH} characters"
            ))),
            _ => Ok(Self(name.to_owned())),
        }
    }
}

impl AsRef<str> for MemberName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for MemberName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MemberName> for String {
    fn from(name: MemberName) -> Self {
        name.0
    }
}

impl PartialEq<str> for MemberName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.trim()
    }
}
