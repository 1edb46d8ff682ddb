//! Cursor pagination for the listing page
//!
//! [`PaginationState`] is a plain value changed only through [`reduce`].
//! [`Paginator`] pairs a state with a content source and performs the fetch
//! behind each "load more".

mod paginator;
mod state;

pub use paginator::Paginator;
pub use state::{reduce, Action, PaginationState, PendingRequest, RequestToken, Status};
