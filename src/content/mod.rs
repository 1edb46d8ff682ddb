//! Content module - posts, rich text and timestamps

mod post;
pub mod rich_text;
pub mod timestamp;

pub use post::{ContentBlock, Cursor, PostDetail, PostSummary, PostsPage};
pub(crate) use post::{null_as_empty, optional_cursor};
pub use rich_text::{RichText, RichTextBlock};
