//! Post models

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

use super::rich_text::RichText;
use super::timestamp;

/// A post as shown on the listing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    /// Unique identifier, also the slug of the detail page
    pub uid: String,

    /// First publication date, absent for documents never published
    #[serde(with = "timestamp", default)]
    pub publication_date: Option<DateTime<FixedOffset>>,

    pub title: String,

    #[serde(default)]
    pub subtitle: String,

    #[serde(default)]
    pub author: String,
}

/// A full post as shown on its detail page
#[derive(Debug, Clone, PartialEq)]
pub struct PostDetail {
    pub uid: String,
    pub publication_date: Option<DateTime<FixedOffset>>,
    pub title: String,
    pub banner_url: Option<String>,
    pub author: String,
    pub content: Vec<ContentBlock>,
}

/// One heading/body group of a post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Section heading, empty when the block has none
    #[serde(default, deserialize_with = "null_as_empty")]
    pub heading: String,

    #[serde(default)]
    pub body: RichText,
}

impl ContentBlock {
    pub fn new(heading: impl Into<String>, body: RichText) -> Self {
        Self {
            heading: heading.into(),
            body,
        }
    }

    pub fn has_heading(&self) -> bool {
        !self.heading.is_empty()
    }
}

/// A page of post summaries plus the cursor to the following page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostsPage {
    pub results: Vec<PostSummary>,
    #[serde(default, deserialize_with = "optional_cursor")]
    pub next_page: Option<Cursor>,
}

/// Opaque pointer (URL) to the next page of results
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a cursor string; empty strings mean "no further pages"
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// `null` and `""` both mean the last page
pub(crate) fn optional_cursor<'de, D>(deserializer: D) -> Result<Option<Cursor>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.and_then(Cursor::new))
}

/// Accept `null` where a string is expected
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
