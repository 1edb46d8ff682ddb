//! Template context data

use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::rich_text::as_html;
use crate::content::{PostDetail, PostSummary};
use crate::helpers::{
    date_xml, encode_segment, full_url_for, image_tag, list_url, meta_generator, post_url,
    DateFormatter, ReadingTime,
};
use crate::pagination::PaginationState;

/// Values shared by every page
#[derive(Debug, Clone, Serialize)]
pub struct SiteView {
    pub title: String,
    pub language: String,
    pub home_url: String,
    pub meta_generator: String,
}

impl SiteView {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            language: config.language.clone(),
            home_url: list_url(config, 1),
            meta_generator: meta_generator(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryView {
    pub uid: String,
    pub url: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: Option<String>,
    pub datetime: Option<String>,
}

impl SummaryView {
    pub fn new(post: &PostSummary, config: &SiteConfig, dates: &DateFormatter) -> Self {
        Self {
            uid: post.uid.clone(),
            url: post_url(config, &post.uid),
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            date: dates.format(post.publication_date.as_ref()),
            datetime: post.publication_date.as_ref().map(date_xml),
        }
    }
}

/// The listing page, derived only from a pagination state
#[derive(Debug, Clone, Serialize)]
pub struct ListView {
    pub posts: Vec<SummaryView>,
    pub is_empty: bool,
    /// Present while another page can be loaded
    pub load_more_url: Option<String>,
    pub notice: Option<String>,
}

impl ListView {
    /// `pages` is the number of pages already shown in this view
    pub fn from_state(
        state: &PaginationState,
        pages: usize,
        config: &SiteConfig,
        dates: &DateFormatter,
    ) -> Self {
        let posts: Vec<SummaryView> = state
            .posts()
            .iter()
            .map(|post| SummaryView::new(post, config, dates))
            .collect();
        Self {
            is_empty: posts.is_empty(),
            posts,
            load_more_url: state
                .has_more()
                .then(|| list_url(config, pages.max(1) + 1)),
            notice: state.notice().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    /// Positional key, `section-<index>`
    pub key: String,
    pub heading: String,
    pub body_html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub uid: String,
    pub permalink: String,
    pub title: String,
    /// Banner `<img>` markup
    pub banner: Option<String>,
    pub author: String,
    pub date: Option<String>,
    pub datetime: Option<String>,
    pub reading_time: String,
    pub sections: Vec<SectionView>,
}

impl PostView {
    pub fn new(post: &PostDetail, config: &SiteConfig, dates: &DateFormatter) -> Self {
        let sections = post
            .content
            .iter()
            .enumerate()
            .map(|(i, block)| SectionView {
                key: format!("section-{}", i),
                heading: block.heading.clone(),
                body_html: as_html(&block.body),
            })
            .collect();

        Self {
            uid: post.uid.clone(),
            permalink: full_url_for(config, &format!("post/{}/", encode_segment(&post.uid))),
            title: post.title.clone(),
            banner: post
                .banner_url
                .as_deref()
                .filter(|url| !url.is_empty())
                .map(|url| image_tag(config, url, Some("banner"))),
            author: post.author.clone(),
            date: dates.format(post.publication_date.as_ref()),
            datetime: post.publication_date.as_ref().map(date_xml),
            reading_time: ReadingTime::estimate_with(&post.content, config.words_per_minute)
                .to_string(),
            sections,
        }
    }
}
