//! Typed identifiers.
//!
//! Every entity is keyed by a string newtype so that a section ID can never
//! be passed where a course ID is expected. IDs serialize transparently as
//! plain strings, which keeps the input/output tables readable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Defines a string-backed identifier newtype.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an ID from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the ID as a string slice.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the ID is empty or whitespace only.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Identifier of a time period (e.g. `"R1"`).
    PeriodId
);
define_id!(
    /// Identifier of a course (e.g. `"Biology"`).
    CourseId
);
define_id!(
    /// Identifier of a section (one offering of a course).
    SectionId
);
define_id!(
    /// Identifier of a teacher.
    TeacherId
);
define_id!(
    /// Identifier of a student.
    StudentId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_eq() {
        let a = SectionId::new("S1");
        let b: SectionId = "S1".into();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "S1");
        assert_eq!(a.as_str(), "S1");
    }

    #[test]
    fn test_blank_id() {
        assert!(CourseId::new("  ").is_blank());
        assert!(!CourseId::new("Math").is_blank());
    }

    #[test]
    fn test_serde_transparent() {
        let id = StudentId::new("ST-7");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"ST-7\"");
        let back: StudentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
