use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse classification of what a finding is about, shared across tools.
///
/// Assigned from the per-tool rule tables in [`crate::core::tables`]; rule
/// ids with no table entry map to `Uncategorized` rather than being guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    NetworkExposure,
    AccessControl,
    SecretExposure,
    DependencyVulnerability,
    Misconfiguration,
    Uncategorized,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkExposure => "network-exposure",
            Self::AccessControl => "access-control",
            Self::SecretExposure => "secret-exposure",
            Self::DependencyVulnerability => "dependency-vulnerability",
            Self::Misconfiguration => "misconfiguration",
            Self::Uncategorized => "uncategorized",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_serializes_kebab_case() {
        let json = serde_json::to_string(&Category::NetworkExposure).unwrap();
        assert_eq!(json, "\"network-exposure\"");

        let back: Category = serde_json::from_str("\"dependency-vulnerability\"").unwrap();
        assert_eq!(back, Category::DependencyVulnerability);
    }

    #[test]
    fn display_matches_serde_rename() {
        for cat in [
            Category::NetworkExposure,
            Category::AccessControl,
            Category::SecretExposure,
            Category::DependencyVulnerability,
            Category::Misconfiguration,
            Category::Uncategorized,
        ] {
            let json = serde_json::to_string(&cat).unwrap();
            assert_eq!(json, format!("\"{}\"", cat.as_str()));
        }
    }
}
