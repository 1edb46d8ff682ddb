//! Pagination state and its reducer

use crate::content::{Cursor, PostSummary, PostsPage};

/// Identifies one load request; newer requests carry larger tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// A load that has been issued and not yet completed
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub token: RequestToken,
    pub cursor: Cursor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// A cursor to the next page exists
    HasMore,
    /// The last page has been loaded
    Exhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Issue a request for the page behind the current cursor
    LoadMore,
    /// A request completed with a page
    PageLoaded { token: RequestToken, page: PostsPage },
    /// A request failed; the message is shown to the reader
    LoadFailed { token: RequestToken, message: String },
    /// Hide the failure notice
    DismissNotice,
}

/// Posts shown on one view of the listing page
///
/// Posts are kept in fetch order and only ever appended to. No cursor means
/// no further pages exist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaginationState {
    posts: Vec<PostSummary>,
    next_cursor: Option<Cursor>,
    pending: Option<PendingRequest>,
    last_token: u64,
    notice: Option<String>,
}

impl PaginationState {
    /// Start a view from the first page
    pub fn new(initial: PostsPage) -> Self {
        Self {
            posts: initial.results,
            next_cursor: initial.next_page,
            ..Self::default()
        }
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    pub fn next_cursor(&self) -> Option<&Cursor> {
        self.next_cursor.as_ref()
    }

    pub fn status(&self) -> Status {
        if self.next_cursor.is_some() {
            Status::HasMore
        } else {
            Status::Exhausted
        }
    }

    pub fn has_more(&self) -> bool {
        self.status() == Status::HasMore
    }

    pub fn pending(&self) -> Option<&PendingRequest> {
        self.pending.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Current posts and cursor as a page, used for persisted page data
    pub fn snapshot(&self) -> PostsPage {
        PostsPage {
            results: self.posts.clone(),
            next_page: self.next_cursor.clone(),
        }
    }
}

/// Apply an action to a state, returning the next state
pub fn reduce(mut state: PaginationState, action: Action) -> PaginationState {
    match action {
        Action::LoadMore => {
            let Some(cursor) = state.next_cursor.clone() else {
                return state;
            };
            state.last_token += 1;
            state.pending = Some(PendingRequest {
                token: RequestToken(state.last_token),
                cursor,
            });
        }
        Action::PageLoaded { token, page } => {
            if !is_current(&state, token) {
                tracing::debug!("Dropping stale page for request {}", token.value());
                return state;
            }
            state.posts.extend(page.results);
            state.next_cursor = page.next_page;
            state.pending = None;
            state.notice = None;
        }
        Action::LoadFailed { token, message } => {
            if !is_current(&state, token) {
                tracing::debug!("Dropping stale failure for request {}", token.value());
                return state;
            }
            state.pending = None;
            state.notice = Some(message);
        }
        Action::DismissNotice => {
            state.notice = None;
        }
    }
    state
}

fn is_current(state: &PaginationState, token: RequestToken) -> bool {
    state.pending.as_ref().map(|p| p.token) == Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(uid: &str) -> PostSummary {
        PostSummary {
            uid: uid.to_string(),
            publication_date: None,
            title: uid.to_uppercase(),
            subtitle: String::new(),
            author: "Autor".to_string(),
        }
    }

    fn page(uids: &[&str], next: &str) -> PostsPage {
        PostsPage {
            results: uids.iter().map(|u| summary(u)).collect(),
            next_page: Cursor::new(next),
        }
    }

    fn uids(state: &PaginationState) -> Vec<&str> {
        state.posts().iter().map(|p| p.uid.as_str()).collect()
    }

    fn token_of(state: &PaginationState) -> RequestToken {
        state.pending().unwrap().token
    }

    #[test]
    fn test_load_more_appends_and_exhausts() {
        let state = PaginationState::new(page(&["p1", "p2", "p3"], "page2"));
        assert_eq!(state.status(), Status::HasMore);

        let state = reduce(state, Action::LoadMore);
        assert!(state.is_loading());
        assert_eq!(state.pending().unwrap().cursor.as_str(), "page2");

        let token = token_of(&state);
        let state = reduce(
            state,
            Action::PageLoaded {
                token,
                page: page(&["p4", "p5"], ""),
            },
        );
        assert_eq!(uids(&state), vec!["p1", "p2", "p3", "p4", "p5"]);
        assert_eq!(state.status(), Status::Exhausted);
        assert!(!state.is_loading());
    }

    #[test]
    fn test_load_more_when_exhausted_is_noop() {
        let state = PaginationState::new(page(&["p1"], ""));
        let next = reduce(state.clone(), Action::LoadMore);
        assert_eq!(next, state);
    }

    #[test]
    fn test_failure_keeps_posts_and_cursor() {
        let state = reduce(
            PaginationState::new(page(&["p1", "p2", "p3"], "page2")),
            Action::LoadMore,
        );
        let token = token_of(&state);
        let state = reduce(
            state,
            Action::LoadFailed {
                token,
                message: "network error".to_string(),
            },
        );
        assert_eq!(uids(&state), vec!["p1", "p2", "p3"]);
        assert_eq!(state.next_cursor().unwrap().as_str(), "page2");
        assert_eq!(state.notice(), Some("network error"));
        assert!(!state.is_loading());

        let state = reduce(state, Action::DismissNotice);
        assert_eq!(state.notice(), None);
    }

    #[test]
    fn test_success_clears_notice() {
        let state = PaginationState::new(page(&["p1"], "page2"));
        let state = reduce(state, Action::LoadMore);
        let token = token_of(&state);
        let state = reduce(
            state,
            Action::LoadFailed {
                token,
                message: "boom".to_string(),
            },
        );
        let state = reduce(state, Action::LoadMore);
        let token = token_of(&state);
        let state = reduce(
            state,
            Action::PageLoaded {
                token,
                page: page(&["p2"], "page3"),
            },
        );
        assert_eq!(state.notice(), None);
        assert_eq!(state.next_cursor().unwrap().as_str(), "page3");
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let state = PaginationState::new(page(&["p1"], "page2"));
        let state = reduce(state, Action::LoadMore);
        let first = token_of(&state);
        let state = reduce(state, Action::LoadMore);
        let second = token_of(&state);
        assert!(second > first);

        let state = reduce(
            state,
            Action::PageLoaded {
                token: first,
                page: page(&["stale"], "elsewhere"),
            },
        );
        assert_eq!(uids(&state), vec!["p1"]);
        assert!(state.is_loading());

        let state = reduce(
            state,
            Action::LoadFailed {
                token: first,
                message: "late failure".to_string(),
            },
        );
        assert_eq!(state.notice(), None);

        let state = reduce(
            state,
            Action::PageLoaded {
                token: second,
                page: page(&["p2"], ""),
            },
        );
        assert_eq!(uids(&state), vec!["p1", "p2"]);
        assert_eq!(state.status(), Status::Exhausted);
    }

    #[test]
    fn test_no_dedup_and_length_arithmetic() {
        let mut state = PaginationState::new(page(&["a", "b", "c"], "c1"));
        let sizes = [2usize, 3, 1];
        for (i, size) in sizes.iter().enumerate() {
            state = reduce(state, Action::LoadMore);
            let token = token_of(&state);
            let results: Vec<&str> = vec!["a"; *size];
            let next = if i + 1 < sizes.len() { "more" } else { "" };
            state = reduce(
                state,
                Action::PageLoaded {
                    token,
                    page: page(&results, next),
                },
            );
        }
        assert_eq!(state.posts().len(), 3 + 2 + 3 + 1);
        assert_eq!(&uids(&state)[..3], &["a", "b", "c"]);
        assert_eq!(state.status(), Status::Exhausted);
    }

    #[test]
    fn test_snapshot() {
        let state = PaginationState::new(page(&["p1"], "page2"));
        let snapshot = state.snapshot();
        assert_eq!(snapshot.results.len(), 1);
        assert_eq!(snapshot.next_page.unwrap().as_str(), "page2");
    }
}
