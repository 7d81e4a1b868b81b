//! Jenkins plugin identifiers

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A plugin pinned to a version, parsed from "name:version"
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Plugin {
    /// Plugin short name (e.g. "git")
    pub name: String,
    /// Required version (e.g. "3.9.1")
    pub version: String,
}

/// Why a "name:version" token was rejected
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PluginParseError {
    /// Token did not contain exactly one ':' separator
    #[error("invalid plugin format '{0}', expected 'name:version'")]
    Format(String),

    /// Name contained characters outside [A-Za-z0-9_-]
    #[error("invalid plugin name '{name}' in '{token}'")]
    Name {
        /// Offending name
        name: String,
        /// Whole token
        token: String,
    },

    /// Version contained characters outside [A-Za-z0-9._-]
    #[error("invalid plugin version '{version}' in '{token}'")]
    Version {
        /// Offending version
        version: String,
        /// Whole token
        token: String,
    },
}

impl Plugin {
    /// Create a plugin from already-validated parts
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn valid_version(version: &str) -> bool {
    !version.is_empty()
        && version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

impl FromStr for Plugin {
    type Err = PluginParseError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let mut parts = token.splitn(2, ':');
        let (Some(name), Some(version)) = (parts.next(), parts.next()) else {
            return Err(PluginParseError::Format(token.to_string()));
        };

        if !valid_name(name) {
            return Err(PluginParseError::Name {
                name: name.to_string(),
                token: token.to_string(),
            });
        }
        if !valid_version(version) {
            return Err(PluginParseError::Version {
                version: version.to_string(),
                token: token.to_string(),
            });
        }

        Ok(Self::new(name, version))
    }
}

impl fmt::Display for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_name_and_version() {
        let plugin: Plugin = "git:3.9.1".parse().unwrap();
        assert_eq!(plugin.name, "git");
        assert_eq!(plugin.version, "3.9.1");
        assert_eq!(plugin.to_string(), "git:3.9.1");
    }

    #[test]
    fn accepts_qualified_versions() {
        let plugin: Plugin = "apache-httpcomponents-client-4-api:4.5.5-3.0".parse().unwrap();
        assert_eq!(plugin.version, "4.5.5-3.0");
    }

    #[rstest]
    #[case("git")]
    #[case("")]
    fn rejects_missing_separator(#[case] token: &str) {
        assert!(matches!(
            token.parse::<Plugin>(),
            Err(PluginParseError::Format(_))
        ));
    }

    #[rstest]
    #[case(":1.0")]
    #[case("git plugin:1.0")]
    #[case("git/plugin:1.0")]
    fn rejects_bad_names(#[case] token: &str) {
        assert!(matches!(
            token.parse::<Plugin>(),
            Err(PluginParseError::Name { .. })
        ));
    }

    #[rstest]
    #[case("git:")]
    #[case("git:1.0:2")]
    #[case("git:1 0")]
    fn rejects_bad_versions(#[case] token: &str) {
        assert!(matches!(
            token.parse::<Plugin>(),
            Err(PluginParseError::Version { .. })
        ));
    }
}
