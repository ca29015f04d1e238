//! Dutch 4-digit postal code (PC4).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of digits in a PC4 code
pub const POSTCODE_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid postcode {input:?}: expected 4 digits")]
pub struct InvalidPostalCode {
    pub input: String,
}

/// A validated 4-digit postal code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostalCode(String);

impl PostalCode {
    /// Parse raw user input. Letters (e.g. the "RB" of "3572RB") are
    /// stripped before validation.
    pub fn parse(raw: &str) -> Result<Self, InvalidPostalCode> {
        let trimmed = trim_zipcode(raw);
        if trimmed.len() == POSTCODE_LEN && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(trimmed))
        } else {
            Err(InvalidPostalCode {
                input: raw.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Remove every alphabetic character and surrounding whitespace.
pub fn trim_zipcode(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_alphabetic())
        .collect::<String>()
        .trim()
        .to_string()
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PostalCode {
    type Error = InvalidPostalCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PostalCode> for String {
    fn from(code: PostalCode) -> Self {
        code.0
    }
}

impl std::str::FromStr for PostalCode {
    type Err = InvalidPostalCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
