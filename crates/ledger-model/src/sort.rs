use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => f.write_str("asc"),
            Self::Desc => f.write_str("desc"),
        }
    }
}

/// The single active sort key of a table.
///
/// The default value (empty key, no direction) applies no ordering.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: String,
    pub direction: Option<SortDirection>,
}

impl SortSpec {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn asc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: Some(SortDirection::Asc),
        }
    }

    pub fn desc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: Some(SortDirection::Desc),
        }
    }

    /// Active key and direction, if this spec orders anything.
    pub fn active(&self) -> Option<(&str, SortDirection)> {
        match self.direction {
            Some(direction) if !self.key.is_empty() => Some((self.key.as_str(), direction)),
            _ => None,
        }
    }

    /// Spec after a header click on `key`.
    ///
    /// The same column cycles none -> asc -> desc -> none; another column
    /// starts ascending and replaces the previous key.
    #[must_use]
    pub fn cycled(&self, key: &str) -> Self {
        if self.key != key {
            return Self::asc(key);
        }
        match self.direction {
            None => Self::asc(key),
            Some(SortDirection::Asc) => Self::desc(key),
            Some(SortDirection::Desc) => Self::none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_clicks_cycle_through_directions() {
        let spec = SortSpec::none();
        let spec = spec.cycled("name");
        assert_eq!(spec, SortSpec::asc("name"));
        let spec = spec.cycled("name");
        assert_eq!(spec, SortSpec::desc("name"));
        let spec = spec.cycled("name");
        assert_eq!(spec, SortSpec::none());
        assert!(spec.active().is_none());
    }

    #[test]
    fn clicking_other_column_restarts_ascending() {
        let spec = SortSpec::desc("name").cycled("amount");
        assert_eq!(spec, SortSpec::asc("amount"));
    }

    #[test]
    fn direction_without_key_is_inactive() {
        let spec = SortSpec {
            key: String::new(),
            direction: Some(SortDirection::Asc),
        };
        assert!(spec.active().is_none());
    }
}
