//! Headless CMS access
//!
//! Everything the site needs from the CMS goes through [`ContentSource`]:
//! the first page of summaries, following a page cursor and looking a post
//! up by uid. [`PrismicClient`] implements it over the Prismic REST API.

mod error;
mod prismic;
pub mod response;

pub use error::FetchError;
pub use prismic::PrismicClient;

use crate::content::{Cursor, PostDetail, PostsPage};

#[async_trait::async_trait]
pub trait ContentSource: Send + Sync {
    /// First page of post summaries, newest documents as ordered by the CMS
    async fn first_page(&self, page_size: usize) -> Result<PostsPage, FetchError>;

    /// Page pointed to by a cursor obtained from a previous page
    async fn next_page(&self, cursor: &Cursor) -> Result<PostsPage, FetchError>;

    /// Full post by uid; `None` when no document has that uid
    async fn post_by_uid(&self, uid: &str) -> Result<Option<PostDetail>, FetchError>;
}
