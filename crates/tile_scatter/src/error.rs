//! Error types and result alias for the crate.
//!
//! [`enum@crate::error::Error`] covers malformed rules (reported when a rule is
//! registered), invalid run configuration and unusable terrain. Runtime outcomes such
//! as a rule finding no eligible tiles are not errors.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid rule '{rule}': {reason}")]
    InvalidRule { rule: String, reason: String },

    #[error("invalid terrain: {0}")]
    InvalidTerrain(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn rule(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidRule {
            rule: rule.into(),
            reason: reason.into(),
        }
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_allocates_owned_message() {
        let err: Error = "issue".into();
        assert!(matches!(err, Error::Other(ref msg) if msg == "issue"));
    }

    #[test]
    fn invalid_rule_message_names_the_rule() {
        let err = Error::rule("CoconutTrees", "spawn_blocks must not be empty");
        assert_eq!(
            err.to_string(),
            "invalid rule 'CoconutTrees': spawn_blocks must not be empty"
        );
    }
}
