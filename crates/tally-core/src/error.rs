// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Tally archive-invalidation toolkit.

use thiserror::Error;

/// The primary error type used across the Tally workspace.
///
/// Validation variants carry the exact operator-facing message for the
/// administrative commands; they are always raised before any write.
#[derive(Debug, Error)]
pub enum TallyError {
    /// A date token is neither a calendar date nor a `date,date` range.
    #[error("Invalid date or date range specifier: '{0}'")]
    InvalidDateSpecifier(String),

    /// A range-period request received something other than a two-date range.
    #[error("The date '{0}' is not a correct date range.")]
    InvalidDateRange(String),

    /// An unrecognized period name was requested.
    #[error("Invalid period type: '{0}'")]
    InvalidPeriodType(String),

    /// The site list is empty, non-numeric, or names an unknown site.
    #[error("Invalid --sites value: '{0}'")]
    InvalidSiteList(String),

    /// A segment condition does not parse as a segment expression.
    #[error("The segment condition '{0}' is not valid.")]
    InvalidSegment(String),

    /// A `--older-than`/`--newer-than` expression could not be parsed.
    #[error("Invalid value for --{option} provided.")]
    InvalidTimeFilter { option: String },

    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TallyError {
    /// Wrap any error as a storage failure.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        TallyError::Storage {
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_match_command_contracts() {
        assert_eq!(
            TallyError::InvalidDateSpecifier("garbage".into()).to_string(),
            "Invalid date or date range specifier: 'garbage'"
        );
        assert_eq!(
            TallyError::InvalidDateRange("2019-01-01".into()).to_string(),
            "The date '2019-01-01' is not a correct date range."
        );
        assert_eq!(
            TallyError::InvalidPeriodType("cranberries".into()).to_string(),
            "Invalid period type: 'cranberries'"
        );
        assert_eq!(
            TallyError::InvalidSiteList("wolfalice".into()).to_string(),
            "Invalid --sites value: 'wolfalice'"
        );
        assert_eq!(
            TallyError::InvalidSegment("nonsense".into()).to_string(),
            "The segment condition 'nonsense' is not valid."
        );
        assert_eq!(
            TallyError::InvalidTimeFilter {
                option: "older-than".into()
            }
            .to_string(),
            "Invalid value for --older-than provided."
        );
    }
}
