//! Generator module - writes the static pages of the site
//!
//! Output layout under the public directory:
//!
//! ```text
//! index.html            first page of the listing
//! page-data.json        first page as data, the start of every "load more"
//! post/<uid>/index.html one per post of the first page
//! 404.html
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

use crate::cms::ContentSource;
use crate::content::PostsPage;
use crate::helpers::is_safe_segment;
use crate::pagination::PaginationState;
use crate::templates::PageRenderer;
use crate::Site;

/// Initial page data persisted next to the listing page
pub const PAGE_DATA_FILE: &str = "page-data.json";
pub const NOT_FOUND_FILE: &str = "404.html";

/// Result of a site generation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    /// Summaries on the first page
    pub listed: usize,
    /// Post pages written
    pub written: usize,
    /// Uids left without a page
    pub skipped: Vec<String>,
    /// Whether the CMS has more pages after the first
    pub has_more: bool,
}

/// Static site generator
pub struct Generator {
    site: Site,
    source: Arc<dyn ContentSource>,
    pages: PageRenderer,
}

impl Generator {
    pub fn new(site: &Site, source: Arc<dyn ContentSource>) -> Result<Self> {
        let pages = PageRenderer::new(&site.config, &site.i18n()?)?;
        Ok(Self {
            site: site.clone(),
            source,
            pages,
        })
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    pub fn source(&self) -> &dyn ContentSource {
        self.source.as_ref()
    }

    pub fn pages(&self) -> &PageRenderer {
        &self.pages
    }

    /// Generate the listing page, the first page's posts and the 404 page
    pub async fn generate(&self) -> Result<GenerateReport> {
        let public_dir = &self.site.public_dir;
        fs::create_dir_all(public_dir)
            .await
            .with_context(|| format!("failed to create {:?}", public_dir))?;

        let first = self
            .source
            .first_page(self.site.config.page_size())
            .await
            .context("failed to fetch the first page of posts")?;
        tracing::info!(
            "Fetched {} posts (more pages: {})",
            first.results.len(),
            first.next_page.is_some()
        );

        let mut report = GenerateReport {
            listed: first.results.len(),
            has_more: first.next_page.is_some(),
            ..GenerateReport::default()
        };

        self.write_page_data(&first).await?;
        self.generate_index(&first).await?;

        for summary in &first.results {
            if !is_safe_segment(&summary.uid) {
                tracing::warn!("Skipping post with unusable uid {:?}", summary.uid);
                report.skipped.push(summary.uid.clone());
                continue;
            }
            if self.write_post(&summary.uid).await? {
                report.written += 1;
            } else {
                tracing::warn!("Post {} is listed but could not be found", summary.uid);
                report.skipped.push(summary.uid.clone());
            }
        }

        self.generate_not_found().await?;

        Ok(report)
    }

    async fn write_page_data(&self, page: &PostsPage) -> Result<()> {
        let json = serde_json::to_string_pretty(page)?;
        write_file(&self.site.public_dir.join(PAGE_DATA_FILE), &json).await
    }

    async fn generate_index(&self, page: &PostsPage) -> Result<()> {
        let state = PaginationState::new(page.clone());
        let html = self.pages.list(&state, 1)?;
        write_file(&self.site.public_dir.join("index.html"), &html).await
    }

    async fn generate_not_found(&self) -> Result<()> {
        let html = self.pages.not_found()?;
        write_file(&self.site.public_dir.join(NOT_FOUND_FILE), &html).await
    }

    /// Fetch one post and write its page
    ///
    /// Returns `false` when the CMS has no post with that uid.
    pub async fn write_post(&self, uid: &str) -> Result<bool> {
        if !is_safe_segment(uid) {
            return Ok(false);
        }
        let Some(post) = self
            .source
            .post_by_uid(uid)
            .await
            .with_context(|| format!("failed to fetch post {}", uid))?
        else {
            return Ok(false);
        };

        let html = self.pages.post(&post)?;
        write_file(&post_output_path(&self.site.public_dir, uid), &html).await?;
        tracing::debug!("Generated post: {}", uid);
        Ok(true)
    }
}

/// Where the page of a post lives under the public directory
pub fn post_output_path(public_dir: &Path, uid: &str) -> PathBuf {
    public_dir.join("post").join(uid).join("index.html")
}

/// Read the persisted first page
pub async fn load_page_data(public_dir: &Path) -> Result<PostsPage> {
    let path = public_dir.join(PAGE_DATA_FILE);
    let json = fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read {:?}", path))?;
    serde_json::from_str(&json).with_context(|| format!("failed to parse {:?}", path))
}

async fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, content)
        .await
        .with_context(|| format!("failed to write {:?}", path))
}
