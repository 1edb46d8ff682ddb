//! Drives a [`PaginationState`] against a content source

use super::state::{reduce, Action, PaginationState};
use crate::cms::{ContentSource, FetchError};
use crate::content::PostsPage;

/// Listing page view that can load further pages on demand
pub struct Paginator<'a, S: ContentSource + ?Sized> {
    source: &'a S,
    state: PaginationState,
}

impl<'a, S: ContentSource + ?Sized> Paginator<'a, S> {
    pub fn new(source: &'a S, initial: PostsPage) -> Self {
        Self {
            source,
            state: PaginationState::new(initial),
        }
    }

    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }

    /// Fetch the page behind the cursor and append it
    ///
    /// Returns how many posts were appended. Does nothing once the last page
    /// has been loaded. On failure the posts and cursor are left untouched
    /// and the state carries a notice.
    pub async fn load_more(&mut self) -> Result<usize, FetchError> {
        if !self.state.has_more() {
            return Ok(0);
        }

        self.dispatch(Action::LoadMore);
        let Some(request) = self.state.pending().cloned() else {
            return Ok(0);
        };

        tracing::debug!(
            "Loading more posts (request {}) from {}",
            request.token.value(),
            request.cursor
        );

        match self.source.next_page(&request.cursor).await {
            Ok(page) => {
                let before = self.state.posts().len();
                self.dispatch(Action::PageLoaded {
                    token: request.token,
                    page,
                });
                let added = self.state.posts().len() - before;
                tracing::info!(
                    "Loaded {} more posts, {} in view",
                    added,
                    self.state.posts().len()
                );
                Ok(added)
            }
            Err(error) => {
                tracing::warn!("Loading more posts failed ({}): {}", error.kind(), error);
                self.dispatch(Action::LoadFailed {
                    token: request.token,
                    message: error.to_string(),
                });
                Err(error)
            }
        }
    }

    /// Load up to `pages` further pages, stopping at the last page or at the
    /// first failure. Returns the number of pages loaded.
    pub async fn load_pages(&mut self, pages: usize) -> usize {
        let mut loaded = 0;
        while loaded < pages && self.state.has_more() {
            if self.load_more().await.is_err() {
                break;
            }
            loaded += 1;
        }
        loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Cursor, PostDetail, PostSummary};
    use crate::pagination::Status;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Pages keyed by cursor; unknown cursors fail with a 500
    struct StubSource {
        pages: HashMap<String, PostsPage>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(pages: Vec<(&str, PostsPage)>) -> Self {
            Self {
                pages: pages
                    .into_iter()
                    .map(|(cursor, page)| (cursor.to_string(), page))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl ContentSource for StubSource {
        async fn first_page(&self, _page_size: usize) -> Result<PostsPage, FetchError> {
            Ok(self.pages.get("first").cloned().unwrap_or_default())
        }

        async fn next_page(&self, cursor: &Cursor) -> Result<PostsPage, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pages
                .get(cursor.as_str())
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    status: 500,
                    url: cursor.to_string(),
                })
        }

        async fn post_by_uid(&self, _uid: &str) -> Result<Option<PostDetail>, FetchError> {
            Ok(None)
        }
    }

    fn summary(uid: &str) -> PostSummary {
        PostSummary {
            uid: uid.to_string(),
            publication_date: None,
            title: uid.to_string(),
            subtitle: String::new(),
            author: String::new(),
        }
    }

    fn page(uids: &[&str], next: &str) -> PostsPage {
        PostsPage {
            results: uids.iter().map(|u| summary(u)).collect(),
            next_page: Cursor::new(next),
        }
    }

    fn uids<S: ContentSource + ?Sized>(paginator: &Paginator<'_, S>) -> Vec<String> {
        paginator
            .state()
            .posts()
            .iter()
            .map(|p| p.uid.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_load_more_until_exhausted() {
        let source = StubSource::new(vec![("page2", page(&["p4", "p5"], ""))]);
        let mut paginator = Paginator::new(&source, page(&["p1", "p2", "p3"], "page2"));

        assert_eq!(paginator.load_more().await.unwrap(), 2);
        assert_eq!(uids(&paginator), vec!["p1", "p2", "p3", "p4", "p5"]);
        assert_eq!(paginator.state().status(), Status::Exhausted);

        assert_eq!(paginator.load_more().await.unwrap(), 0);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_leaves_view_unchanged() {
        let source = StubSource::new(vec![]);
        let mut paginator = Paginator::new(&source, page(&["p1", "p2", "p3"], "broken"));

        let err = paginator.load_more().await.unwrap_err();
        assert_eq!(err.kind(), "status");
        assert_eq!(uids(&paginator), vec!["p1", "p2", "p3"]);
        assert_eq!(paginator.state().next_cursor().unwrap().as_str(), "broken");
        assert!(paginator.state().notice().is_some());
        assert!(!paginator.state().is_loading());
    }

    #[tokio::test]
    async fn test_load_pages_follows_cursors() {
        let source = StubSource::new(vec![
            ("c2", page(&["b1", "b2", "b3"], "c3")),
            ("c3", page(&["c1"], "")),
        ]);
        let mut paginator = Paginator::new(&source, page(&["a1", "a2", "a3"], "c2"));

        assert_eq!(paginator.load_pages(10).await, 2);
        assert_eq!(paginator.state().posts().len(), 7);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_load_pages_stops_on_failure() {
        let source = StubSource::new(vec![("c2", page(&["b1"], "missing"))]);
        let mut paginator = Paginator::new(&source, page(&["a1"], "c2"));

        assert_eq!(paginator.load_pages(5).await, 1);
        assert_eq!(uids(&paginator), vec!["a1", "b1"]);
        assert!(paginator.state().notice().is_some());
        assert!(paginator.state().has_more());
    }

    #[tokio::test]
    async fn test_works_through_trait_object() {
        let source = StubSource::new(vec![("c2", page(&["b1"], ""))]);
        let dynamic: &dyn ContentSource = &source;
        let mut paginator = Paginator::new(dynamic, page(&["a1"], "c2"));
        assert_eq!(paginator.load_more().await.unwrap(), 1);
    }
}
