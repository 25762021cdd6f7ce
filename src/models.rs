mod content;
mod content_kind;
mod difficulty;
mod hierarchy;
mod ids;

pub use content::{ContentRow, NewContent};
pub use content_kind::{ContentKind, UnknownContentKind};
pub use difficulty::Difficulty;
pub use hierarchy::{Hierarchy, Subject, Subtopic, Topic};
pub use ids::{RowId, SubjectId, SubtopicId, TopicId};
