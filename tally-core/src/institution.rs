//! The closed set of supported statement sources.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A statement source with its own column layout and quirks.
///
/// Adding an institution means adding a variant here; every `match` over it
/// then has to handle the new source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Institution {
    #[serde(rename = "capitalOne")]
    CapitalOne,
    #[serde(rename = "schwab")]
    Schwab,
}

impl Institution {
    pub const ALL: [Institution; 2] = [Institution::CapitalOne, Institution::Schwab];

    /// Key used in configuration files.
    pub fn key(&self) -> &'static str {
        match self {
            Institution::CapitalOne => "capitalOne",
            Institution::Schwab => "schwab",
        }
    }

    /// Source columns holding the transaction amount. A row with both empty
    /// is not a transaction.
    pub fn monetary_columns(&self) -> [&'static str; 2] {
        match self {
            Institution::CapitalOne => ["Debit", "Credit"],
            Institution::Schwab => ["Withdrawal (-)", "Deposit (+)"],
        }
    }
}

impl fmt::Display for Institution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Institution {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Institution::ALL
            .into_iter()
            .find(|i| i.key() == s.trim())
            .ok_or_else(|| ConfigError::UnknownInstitution {
                key: s.to_string(),
                expected: Institution::ALL
                    .iter()
                    .map(|i| i.key())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_keys() {
        assert_eq!("capitalOne".parse::<Institution>().unwrap(), Institution::CapitalOne);
        assert_eq!("schwab".parse::<Institution>().unwrap(), Institution::Schwab);
    }

    #[test]
    fn test_unknown_key_is_config_error() {
        let err = "chase".parse::<Institution>().unwrap_err();
        match err {
            ConfigError::UnknownInstitution { key, expected } => {
                assert_eq!(key, "chase");
                assert_eq!(expected, "capitalOne, schwab");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_key_round_trips_through_display() {
        for i in Institution::ALL {
            assert_eq!(i.to_string().parse::<Institution>().unwrap(), i);
        }
    }
}
