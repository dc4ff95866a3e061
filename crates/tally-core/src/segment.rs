// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Visitor segment definitions and the archive completion-flag names
//! derived from them.
//!
//! A segment is either "all visits" (the empty definition, matching every
//! site) or an expression of `dimension operator value` conditions joined
//! by `;` (AND) or `,` (OR). Only syntactic validity is checked here;
//! whether a dimension exists is the reporting layer's concern.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::TallyError;

/// One `dimension operator value` condition. Two-character operators must
/// be listed before their one-character prefixes.
static CONDITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*(==|!=|<=|>=|=@|!@|=\^|=\$|<|>).+$")
        .expect("valid condition regex")
});

/// A validated segment definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    definition: String,
}

impl Segment {
    /// The "all visits" segment (empty definition).
    pub fn all_visits() -> Segment {
        Segment {
            definition: String::new(),
        }
    }

    /// Validate a raw definition string. The empty string is the
    /// "all visits" segment; anything else must be a well-formed
    /// expression or the whole request is rejected.
    pub fn parse(definition: &str) -> Result<Segment, TallyError> {
        if definition.is_empty() {
            return Ok(Segment::all_visits());
        }
        for condition in definition.split([';', ',']) {
            if !CONDITION_RE.is_match(condition) {
                return Err(TallyError::InvalidSegment(definition.to_string()));
            }
        }
        Ok(Segment {
            definition: definition.to_string(),
        })
    }

    pub fn is_all_visits(&self) -> bool {
        self.definition.is_empty()
    }

    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// 32-hex-char digest of the definition, embedded in archive names.
    /// The "all visits" segment has no hash component.
    pub fn hash(&self) -> String {
        if self.is_all_visits() {
            String::new()
        } else {
            format!("{:x}", md5::compute(self.definition.as_bytes()))
        }
    }

    /// Build the completion-flag name an invalidation is keyed by:
    /// `done` for all visits, `done<hash>` for a segment, with an
    /// optional `.<PluginName>` suffix for single-plugin invalidations.
    pub fn done_name(&self, plugin: Option<&str>) -> String {
        let mut name = format!("done{}", self.hash());
        if let Some(plugin) = plugin {
            name.push('.');
            name.push_str(plugin);
        }
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_definition_is_all_visits() {
        let segment = Segment::parse("").unwrap();
        assert!(segment.is_all_visits());
        assert_eq!(segment.hash(), "");
        assert_eq!(segment.done_name(None), "done");
        assert_eq!(segment.done_name(Some("Actions")), "done.Actions");
    }

    #[test]
    fn simple_conditions_parse() {
        for definition in [
            "browserCode==IE",
            "dimension1==test",
            "countryCode!=fr",
            "actions>=10",
            "pageUrl=@shop",
            "referrerName=^goo",
            "visitCount<5",
        ] {
            assert!(Segment::parse(definition).is_ok(), "{definition}");
        }
    }

    #[test]
    fn compound_conditions_parse() {
        assert!(Segment::parse("browserCode==IE;countryCode==de").is_ok());
        assert!(Segment::parse("browserCode==IE,browserCode==FF").is_ok());
    }

    #[test]
    fn tokens_without_an_operator_are_rejected() {
        for definition in ["ablksdjfdslkjf", "custom dimension", "browserCode", "==IE"] {
            let err = Segment::parse(definition).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("The segment condition '{definition}' is not valid.")
            );
        }
    }

    #[test]
    fn partially_valid_compounds_are_rejected() {
        assert!(Segment::parse("browserCode==IE;garbage").is_err());
    }

    #[test]
    fn hash_is_md5_of_the_definition() {
        let segment = Segment::parse("browserCode==IE").unwrap();
        assert_eq!(segment.hash(), "5f4f9bafeda3443c3c2d4b2ef4dffadc");
        assert_eq!(segment.done_name(None), "done5f4f9bafeda3443c3c2d4b2ef4dffadc");

        let segment = Segment::parse("dimension1==test").unwrap();
        assert_eq!(segment.hash(), "9aedf9b6022140586347897209404279");
        assert_eq!(
            segment.done_name(Some("Actions")),
            "done9aedf9b6022140586347897209404279.Actions"
        );
    }
}
