//! Linked-account credential decoding
//!
//! The host hands us the bearer string produced by account linking. It packs
//! the Quizlet username and the OAuth access token as `owner|token`.

use serde::{Deserialize, Serialize};

const DELIMITER: char = '|';

/// Decoded linked-account credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub owner_id: String,
    pub access_token: String,
}

impl Credential {
    /// Split a raw bearer string on the first delimiter.
    ///
    /// A string without a delimiter yields the whole string for both halves.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(DELIMITER) {
            Some((owner, token)) => Self {
                owner_id: owner.to_string(),
                access_token: token.to_string(),
            },
            None => Self {
                owner_id: raw.to_string(),
                access_token: raw.to_string(),
            },
        }
    }

    /// Decode an optional raw credential, treating empty strings as absent
    pub fn from_optional(raw: Option<&str>) -> Option<Self> {
        raw.filter(|s| !s.is_empty()).map(Self::parse)
    }
}
