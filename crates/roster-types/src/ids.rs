//! Type-safe identifier wrappers around database row IDs.
//!
//! Every table uses an `INTEGER PRIMARY KEY`, so identifiers are `i64`
//! newtypes. Wrapping them prevents passing a course ID where a student
//! ID is expected.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around an `i64` row ID with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Return the inner row ID.
            pub const fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Identifier of a registered user account.
    UserId
}

define_id! {
    /// Identifier of a student record.
    StudentId
}

define_id! {
    /// Identifier of a course.
    CourseId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_raw_row_id() {
        assert_eq!(StudentId(42).to_string(), "42");
        assert_eq!(CourseId::from(7).into_inner(), 7);
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&UserId(3)).unwrap_or_default();
        assert_eq!(json, "3");
        let back: StudentId = serde_json::from_str("12").unwrap_or(StudentId(0));
        assert_eq!(back, StudentId(12));
    }
}
