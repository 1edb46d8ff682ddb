//! Preview server
//!
//! Serves the public directory and adds the two dynamic behaviours of the
//! site: `/?pages=N` rebuilds the listing after N-1 "load more" steps, and
//! `/post/<uid>` fetches posts that were not generated at build time.

use anyhow::Result;
use axum::{
    extract::{Path as UrlPath, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::collections::{HashSet, VecDeque};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::generator::{load_page_data, post_output_path, Generator, NOT_FOUND_FILE};
use crate::helpers::is_safe_segment;
use crate::pagination::Paginator;

/// Upper bound for `?pages=`
pub const MAX_PAGES: usize = 50;

/// How many unknown uids are remembered before the oldest is forgotten
pub const MAX_MISSING: usize = 1024;

/// Background fetches allowed at once; further slugs wait for a refresh
pub const MAX_IN_FLIGHT: usize = 16;

/// Server state
pub struct ServerState {
    generator: Generator,
    public_dir: PathBuf,
    /// Uids with a background fetch running
    in_flight: Mutex<HashSet<String>>,
    /// Uids the CMS does not know
    missing: Mutex<MissingUids>,
}

impl ServerState {
    pub fn new(generator: Generator) -> Self {
        Self {
            public_dir: generator.site().public_dir.clone(),
            generator,
            in_flight: Mutex::new(HashSet::new()),
            missing: Mutex::new(MissingUids::new(MAX_MISSING)),
        }
    }
}

/// Unknown uids in insertion order, capped at a fixed size
#[derive(Debug)]
pub struct MissingUids {
    capacity: usize,
    order: VecDeque<String>,
    uids: HashSet<String>,
}

impl MissingUids {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order: VecDeque::new(),
            uids: HashSet::new(),
        }
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.uids.contains(uid)
    }

    pub fn len(&self) -> usize {
        self.uids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uids.is_empty()
    }

    /// Remember `uid`, forgetting the oldest entry when full
    pub fn insert(&mut self, uid: String) {
        if self.uids.contains(&uid) {
            return;
        }
        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.uids.remove(&oldest);
            }
        }
        self.uids.insert(uid.clone());
        self.order.push_back(uid);
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub pages: Option<usize>,
}

/// Build the application router
pub fn router(state: Arc<ServerState>) -> Router {
    let static_files = ServeDir::new(&state.public_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(state.public_dir.join(NOT_FOUND_FILE)));

    Router::new()
        .route("/", get(list_handler))
        .route("/post/:slug", get(post_handler))
        .route("/post/:slug/", get(post_handler))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the preview server
pub async fn start(generator: Generator, ip: &str, port: u16) -> Result<()> {
    let state = Arc::new(ServerState::new(generator));
    let app = router(state);

    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Listing page, rebuilt from the persisted first page when `pages` > 1
async fn list_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ListQuery>,
) -> Response {
    let pages = query.pages.unwrap_or(1).clamp(1, MAX_PAGES);
    if pages == 1 {
        return match tokio::fs::read_to_string(state.public_dir.join("index.html")).await {
            Ok(html) => Html(html).into_response(),
            Err(_) => not_found(&state).await,
        };
    }

    let first = match load_page_data(&state.public_dir).await {
        Ok(first) => first,
        Err(e) => {
            tracing::error!("Cannot rebuild the listing: {:#}", e);
            return server_error();
        }
    };

    let mut paginator = Paginator::new(state.generator.source(), first);
    let loaded = paginator.load_pages(pages - 1).await;
    tracing::debug!("Listing rebuilt with {} of {} extra pages", loaded, pages - 1);

    match state.generator.pages().list(paginator.state(), loaded + 1) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Failed to render listing: {:#}", e);
            server_error()
        }
    }
}

/// Generated post page, or a loading page while it is fetched
async fn post_handler(
    State(state): State<Arc<ServerState>>,
    UrlPath(slug): UrlPath<String>,
) -> Response {
    if !is_safe_segment(&slug) {
        return not_found(&state).await;
    }

    let path = post_output_path(&state.public_dir, &slug);
    if let Ok(html) = tokio::fs::read_to_string(&path).await {
        return Html(html).into_response();
    }

    if state.missing.lock().await.contains(&slug) {
        return not_found(&state).await;
    }

    let started = {
        let mut in_flight = state.in_flight.lock().await;
        in_flight.len() < MAX_IN_FLIGHT && in_flight.insert(slug.clone())
    };
    if started {
        tracing::info!("Fetching post {} on demand", slug);
        let task_state = state.clone();
        let uid = slug.clone();
        tokio::spawn(async move {
            fetch_post(task_state, uid).await;
        });
    }

    match state.generator.pages().loading(&slug) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Failed to render loading page: {:#}", e);
            server_error()
        }
    }
}

async fn fetch_post(state: Arc<ServerState>, uid: String) {
    match state.generator.write_post(&uid).await {
        Ok(true) => tracing::info!("Generated post {} on demand", uid),
        Ok(false) => {
            tracing::info!("Post {} does not exist", uid);
            state.missing.lock().await.insert(uid.clone());
        }
        Err(e) => tracing::warn!("On-demand fetch of {} failed: {:#}", uid, e),
    }
    state.in_flight.lock().await.remove(&uid);
}

async fn not_found(state: &ServerState) -> Response {
    let html = match tokio::fs::read_to_string(state.public_dir.join(NOT_FOUND_FILE)).await {
        Ok(html) => html,
        Err(_) => match state.generator.pages().not_found() {
            Ok(html) => html,
            Err(_) => return (StatusCode::NOT_FOUND, "Not found").into_response(),
        },
    };
    (StatusCode::NOT_FOUND, Html(html)).into_response()
}

fn server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_uids_are_bounded() {
        let mut missing = MissingUids::new(3);
        for i in 0..10 {
            missing.insert(format!("x{}", i));
        }
        assert_eq!(missing.len(), 3);
        assert!(!missing.contains("x0"));
        assert!(!missing.contains("x6"));
        assert!(missing.contains("x7"));
        assert!(missing.contains("x9"));
    }

    #[test]
    fn test_missing_uids_ignore_repeats() {
        let mut missing = MissingUids::new(2);
        missing.insert("a".to_string());
        missing.insert("a".to_string());
        missing.insert("b".to_string());
        assert_eq!(missing.len(), 2);
        assert!(missing.contains("a"));

        missing.insert("c".to_string());
        assert!(!missing.contains("a"));
        assert!(missing.contains("b"));
        assert!(missing.contains("c"));
    }
}
