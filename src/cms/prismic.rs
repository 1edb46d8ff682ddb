//! Prismic REST API client

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;

use super::response::{ApiInfo, PostFields, SearchResponse, SummaryFields};
use super::{ContentSource, FetchError};
use crate::config::CmsConfig;
use crate::content::{Cursor, PostDetail, PostsPage};

/// Client for a Prismic repository
pub struct PrismicClient {
    client: Client,
    endpoint: Url,
    access_token: Option<String>,
    document_type: String,
    master_ref: OnceCell<String>,
}

impl PrismicClient {
    pub fn new(config: &CmsConfig) -> anyhow::Result<Self> {
        if config.endpoint.trim().is_empty() {
            anyhow::bail!(
                "cms.endpoint is not configured (set it in _config.yml or {})",
                crate::config::ENDPOINT_ENV
            );
        }
        let endpoint = Url::parse(config.endpoint.trim_end_matches('/'))?;
        if endpoint.cannot_be_a_base() {
            anyhow::bail!("cms.endpoint {:?} is not an http(s) url", config.endpoint);
        }
        let client = Client::builder().user_agent(Self::user_agent()).build()?;
        Ok(Self {
            client,
            endpoint,
            access_token: config.access_token.clone(),
            document_type: config.document_type.clone(),
            master_ref: OnceCell::new(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("spacetraveling/", env!("CARGO_PKG_VERSION"))
    }

    /// Ref of the published content, resolved once per client
    async fn master_ref(&self) -> Result<&str, FetchError> {
        let reference = self
            .master_ref
            .get_or_try_init(|| async {
                let url = self.with_token(self.endpoint.clone());
                let info: ApiInfo = self.get_json(url).await?;
                info.master_ref()
                    .map(str::to_string)
                    .ok_or_else(|| FetchError::MissingRef(self.endpoint.to_string()))
            })
            .await?;
        Ok(reference.as_str())
    }

    async fn search_url(&self, query: &str, page_size: usize) -> Result<Url, FetchError> {
        let reference = self.master_ref().await?;
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["documents", "search"]);
        }
        url.query_pairs_mut()
            .append_pair("ref", reference)
            .append_pair("q", query)
            .append_pair("pageSize", &page_size.to_string());
        Ok(self.with_token(url))
    }

    fn with_token(&self, mut url: Url) -> Url {
        if let Some(token) = &self.access_token {
            let has_token = url.query_pairs().any(|(k, _)| k == "access_token");
            if !has_token {
                url.query_pairs_mut().append_pair("access_token", token);
            }
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        tracing::debug!("GET {}", redact(&url));
        let resp = self.client.get(url.clone()).send().await?;
        Self::handle(resp, &url).await
    }

    async fn handle<T: DeserializeOwned>(resp: Response, url: &Url) -> Result<T, FetchError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: redact(url),
            });
        }
        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|source| FetchError::Parse {
            url: redact(url),
            source,
        })
    }
}

#[async_trait::async_trait]
impl ContentSource for PrismicClient {
    async fn first_page(&self, page_size: usize) -> Result<PostsPage, FetchError> {
        let query = format!(r#"[[at(document.type,"{}")]]"#, self.document_type);
        let mut url = self.search_url(&query, page_size).await?;
        let fields = ["title", "subtitle", "author"]
            .iter()
            .map(|f| format!("{}.{}", self.document_type, f))
            .collect::<Vec<_>>()
            .join(",");
        url.query_pairs_mut().append_pair("fetch", &fields);

        let response: SearchResponse<SummaryFields> = self.get_json(url).await?;
        Ok(PostsPage::from(response))
    }

    async fn next_page(&self, cursor: &Cursor) -> Result<PostsPage, FetchError> {
        let url = Url::parse(cursor.as_str()).map_err(|source| FetchError::InvalidCursor {
            cursor: cursor.to_string(),
            source,
        })?;
        let response: SearchResponse<SummaryFields> = self.get_json(self.with_token(url)).await?;
        Ok(PostsPage::from(response))
    }

    async fn post_by_uid(&self, uid: &str) -> Result<Option<PostDetail>, FetchError> {
        let query = uid_query(&self.document_type, uid);
        let url = self.search_url(&query, 1).await?;
        let response: SearchResponse<PostFields> = self.get_json(url).await?;
        Ok(response.results.into_iter().next().map(|mut doc| {
            doc.uid.get_or_insert_with(|| uid.to_string());
            PostDetail::from(doc)
        }))
    }
}

/// Predicate matching one document by uid, with the uid as a quoted string
fn uid_query(document_type: &str, uid: &str) -> String {
    let quoted = uid.replace('\\', "\\\\").replace('"', "\\\"");
    format!(r#"[[at(my.{}.uid,"{}")]]"#, document_type, quoted)
}

/// URL without the access token, for logs and errors
fn redact(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == "access_token") {
        return url.to_string();
    }
    let mut clean = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "access_token")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    clean.query_pairs_mut().clear().extend_pairs(pairs);
    clean.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: &str, token: Option<&str>) -> CmsConfig {
        CmsConfig {
            endpoint: endpoint.to_string(),
            access_token: token.map(str::to_string),
            document_type: "posts".to_string(),
        }
    }

    #[test]
    fn test_requires_endpoint() {
        assert!(PrismicClient::new(&config("", None)).is_err());
    }

    #[test]
    fn test_with_token_appends_once() {
        let client = PrismicClient::new(&config("https://blog.cdn.prismic.io/api/v2", Some("t0k"))).unwrap();
        let url = Url::parse("https://blog.cdn.prismic.io/api/v2/documents/search?page=2").unwrap();
        let url = client.with_token(url);
        assert_eq!(url.query_pairs().filter(|(k, _)| k == "access_token").count(), 1);
        let url = client.with_token(url);
        assert_eq!(url.query_pairs().filter(|(k, _)| k == "access_token").count(), 1);
    }

    #[test]
    fn test_redact_hides_token() {
        let url = Url::parse("https://cms.dev/api?page=2&access_token=secret").unwrap();
        let redacted = redact(&url);
        assert!(!redacted.contains("secret"));
        assert!(redacted.contains("page=2"));
    }

    #[test]
    fn test_uid_query_escapes_quotes_and_backslashes() {
        assert_eq!(uid_query("posts", "hooks"), r#"[[at(my.posts.uid,"hooks")]]"#);
        assert_eq!(uid_query("posts", r#"a"b"#), r#"[[at(my.posts.uid,"a\"b")]]"#);
        assert_eq!(uid_query("posts", r"trail\"), r#"[[at(my.posts.uid,"trail\\")]]"#);
    }

    #[tokio::test]
    async fn test_invalid_cursor() {
        let client = PrismicClient::new(&config("https://blog.cdn.prismic.io/api/v2", None)).unwrap();
        let cursor = Cursor::new("not a url").unwrap();
        let err = client.next_page(&cursor).await.unwrap_err();
        assert_eq!(err.kind(), "cursor");
    }
}
