use serde::{Deserialize, Serialize};

/// Header carrying the caller's identity, both inbound and towards the backends.
pub const USER_HEADER: &str = "X-User-Name";

/// Caller identity as supplied in the `X-User-Name` header.
///
/// The value is free-form and never verified; it is threaded through every
/// backend call unmodified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Creates a username from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the username as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Username {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Username {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_is_passed_through_unmodified() {
        let name = Username::from("  Test Max ");
        assert_eq!(name.as_str(), "  Test Max ");
        assert_eq!(name.to_string(), "  Test Max ");
    }

    #[test]
    fn username_serializes_as_plain_string() {
        let name = Username::new("alice");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"alice\"");
    }
}
