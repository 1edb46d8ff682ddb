//! List posts from the CMS

use anyhow::{Context, Result};

use crate::content::PostSummary;
use crate::helpers::DateFormatter;
use crate::pagination::Paginator;
use crate::Site;

/// Print the first page of posts, or every page when `all` is set
pub async fn run(site: &Site, all: bool) -> Result<()> {
    let source = site.content_source()?;
    let first = source
        .first_page(site.config.page_size())
        .await
        .context("failed to fetch the first page of posts")?;

    let mut paginator = Paginator::new(source.as_ref(), first);
    if all {
        while paginator.state().has_more() {
            paginator
                .load_more()
                .await
                .context("failed to load the next page of posts")?;
        }
    }

    let dates = DateFormatter::from_config(&site.config);
    let state = paginator.state();
    println!("Posts ({}):", state.posts().len());
    for post in state.posts() {
        println!("  {}", format_line(post, &dates));
    }
    if state.has_more() {
        println!("  ... more posts available (use --all)");
    }

    Ok(())
}

fn format_line(post: &PostSummary, dates: &DateFormatter) -> String {
    let date = dates
        .format(post.publication_date.as_ref())
        .unwrap_or_else(|| "-".to_string());
    format!("{} - {} [{}]", date, post.title, post.uid)
}
