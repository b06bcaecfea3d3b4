use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! newtype_string {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance from a string value.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Return the inner string as a str slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

newtype_string!(
    OwnerId,
    "The opaque identity under which fragments are namespaced."
);
newtype_string!(FragmentId, "A unique fragment identifier.");

impl FragmentId {
    /// Generate a fresh random fragment id.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_from_str() {
        let owner = OwnerId::from("a1b2c3");
        assert_eq!(owner.as_str(), "a1b2c3");
        assert_eq!(&*owner, "a1b2c3");
    }

    #[test]
    fn newtype_from_string() {
        let id = FragmentId::from("frag-42".to_string());
        assert_eq!(id.to_string(), "frag-42");
    }

    #[test]
    fn newtype_serde_roundtrip() {
        let id = FragmentId::new("frag-123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"frag-123\"");
        let back: FragmentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = FragmentId::generate();
        let b = FragmentId::generate();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }
}
