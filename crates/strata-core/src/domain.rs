//! Key domains and their salts.
//!
//! The salt strings are part of the on-disk format: changing any of them
//! makes every existing artifact of that domain undecryptable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StrataError;

/// Inner-layer salt for artifacts carrying real content.
pub const LOCAL_SALT: &str = "violet-soul-salt-local-2026";

/// Inner-layer salt for placeholder artifacts safe to share.
pub const DISTRIBUTION_SALT: &str = "violet-soul-salt-git-2026";

/// Outer-layer salt, shared by every domain.
pub const WRAPPER_SALT: &str = "violet-outer-shell-2026";

/// Salt of the single-layer format that predates layering.
pub const LEGACY_SALT: &str = "violet-soul-salt";

/// Suffix appended to the passphrase when deriving the outer-layer key.
pub const OUTER_PASSPHRASE_SUFFIX: &str = "-outer";

/// Salt context for key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Real content, machine-resident
    Local,
    /// Placeholder content, safe for shared storage
    Distribution,
    /// Outer layer of every layered artifact
    Wrapper,
}

impl Domain {
    /// The fixed salt for this domain.
    pub fn salt(self) -> &'static str {
        match self {
            Domain::Local => LOCAL_SALT,
            Domain::Distribution => DISTRIBUTION_SALT,
            Domain::Wrapper => WRAPPER_SALT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Local => "local",
            Domain::Distribution => "distribution",
            Domain::Wrapper => "wrapper",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = StrataError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Domain::Local),
            // "git" is the name older tooling used for the shareable domain.
            "distribution" | "git" => Ok(Domain::Distribution),
            "wrapper" => Ok(Domain::Wrapper),
            other => Err(StrataError::InvalidInput(format!(
                "Unknown domain: {} (expected local or distribution)",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salts_are_distinct() {
        let salts = [LOCAL_SALT, DISTRIBUTION_SALT, WRAPPER_SALT, LEGACY_SALT];
        for (i, a) in salts.iter().enumerate() {
            for b in &salts[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_domain_parse() {
        assert_eq!("local".parse::<Domain>().unwrap(), Domain::Local);
        assert_eq!("git".parse::<Domain>().unwrap(), Domain::Distribution);
        assert_eq!(" Distribution ".parse::<Domain>().unwrap(), Domain::Distribution);
        assert!("remote".parse::<Domain>().is_err());
    }

    #[test]
    fn test_domain_salt_mapping() {
        assert_eq!(Domain::Local.salt(), LOCAL_SALT);
        assert_eq!(Domain::Distribution.salt(), DISTRIBUTION_SALT);
        assert_eq!(Domain::Wrapper.salt(), WRAPPER_SALT);
    }
}
