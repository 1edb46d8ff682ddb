//! Wire types of the CMS REST API

use serde::{Deserialize, Serialize};

use crate::content::{
    null_as_empty, optional_cursor, timestamp, ContentBlock, Cursor, PostDetail, PostSummary,
    PostsPage,
};

/// API root document, lists the refs content can be read at
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub refs: Vec<ApiRef>,
}

impl ApiInfo {
    pub fn master_ref(&self) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiRef {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

/// One page of a search query
///
/// `results` and `next_page` are required; `next_page` may be null.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse<T> {
    pub results: Vec<Document<T>>,
    #[serde(deserialize_with = "optional_cursor")]
    pub next_page: Option<Cursor>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_results_size: Option<u32>,
}

/// A CMS document with its custom fields under `data`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Document<T> {
    /// Documents created before the type had a uid field carry none
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(with = "timestamp", default)]
    pub first_publication_date: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub data: T,
}

/// Posts without a uid cannot be linked and are left out
impl From<SearchResponse<SummaryFields>> for PostsPage {
    fn from(response: SearchResponse<SummaryFields>) -> Self {
        let results = response
            .results
            .into_iter()
            .filter(|doc| {
                let linkable = doc.uid.as_deref().is_some_and(|uid| !uid.is_empty());
                if !linkable {
                    tracing::warn!("Skipping post {:?} without a uid", doc.data.title);
                }
                linkable
            })
            .map(PostSummary::from)
            .collect();
        PostsPage {
            results,
            next_page: response.next_page,
        }
    }
}

/// Fields fetched for the listing page
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SummaryFields {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subtitle: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub author: String,
}

/// Fields of a full post
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PostFields {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub banner: Banner,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub author: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Banner {
    #[serde(default)]
    pub url: Option<String>,
}

impl From<Document<SummaryFields>> for PostSummary {
    fn from(doc: Document<SummaryFields>) -> Self {
        PostSummary {
            uid: doc.uid.unwrap_or_default(),
            publication_date: doc.first_publication_date,
            title: doc.data.title,
            subtitle: doc.data.subtitle,
            author: doc.data.author,
        }
    }
}

impl From<Document<PostFields>> for PostDetail {
    fn from(doc: Document<PostFields>) -> Self {
        PostDetail {
            uid: doc.uid.unwrap_or_default(),
            publication_date: doc.first_publication_date,
            title: doc.data.title,
            banner_url: doc.data.banner.url.filter(|u| !u.is_empty()),
            author: doc.data.author,
            content: doc.data.content,
        }
    }
}
