//! Board posts and the drafts used to create them.

mod model;

pub use model::{MusicPostDraft, Post, PostAuthor, PostOrdering, PostPatch};
