use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares an opaque string identifier newtype.
///
/// The hosted store keys every table by UUID text, so identifiers are kept as
/// strings and never parsed.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the underlying identifier text.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

string_id!(
    /// Unique identifier for a subject.
    SubjectId
);

string_id!(
    /// Unique identifier for a topic.
    TopicId
);

string_id!(
    /// Unique identifier for a subtopic.
    ///
    /// Every content row references one of these.
    SubtopicId
);

string_id!(
    /// Unique identifier for a row in one of the content tables.
    RowId
);
