//! Page templates using the Tera template engine
//!
//! All templates are embedded in the binary. [`PageRenderer`] turns posts and
//! pagination states into complete HTML pages.

mod views;

pub use views::{ListView, PostView, SectionView, SiteView, SummaryView};

use anyhow::Result;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::PostDetail;
use crate::helpers::{meta_refresh, DateFormatter};
use crate::i18n::I18n;
use crate::pagination::PaginationState;

/// Seconds between reloads of the loading page
pub const LOADING_REFRESH_SECS: u32 = 2;

/// Template renderer with the embedded page templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("pages/layout.html")),
            ("index.html", include_str!("pages/index.html")),
            ("post.html", include_str!("pages/post.html")),
            ("loading.html", include_str!("pages/loading.html")),
            ("not_found.html", include_str!("pages/not_found.html")),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Renders every page of the site
pub struct PageRenderer {
    renderer: TemplateRenderer,
    config: SiteConfig,
    dates: DateFormatter,
    site: SiteView,
    labels: serde_json::Value,
}

impl PageRenderer {
    pub fn new(config: &SiteConfig, i18n: &I18n) -> Result<Self> {
        Ok(Self {
            renderer: TemplateRenderer::new()?,
            config: config.clone(),
            dates: DateFormatter::from_config(config),
            site: SiteView::new(config),
            labels: nest_labels(&i18n.get_all_translations()),
        })
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context.insert("labels", &self.labels);
        context
    }

    /// Listing page for a view that has shown `pages` pages
    pub fn list(&self, state: &PaginationState, pages: usize) -> Result<String> {
        let view = ListView::from_state(state, pages, &self.config, &self.dates);
        let mut context = self.base_context();
        context.insert("list", &view);
        self.renderer.render("index.html", &context)
    }

    pub fn post(&self, post: &PostDetail) -> Result<String> {
        let view = PostView::new(post, &self.config, &self.dates);
        let mut context = self.base_context();
        context.insert("post", &view);
        self.renderer.render("post.html", &context)
    }

    /// Placeholder served while a post is fetched in the background
    pub fn loading(&self, uid: &str) -> Result<String> {
        let mut context = self.base_context();
        context.insert("uid", uid);
        context.insert("refresh", &meta_refresh(LOADING_REFRESH_SECS));
        self.renderer.render("loading.html", &context)
    }

    pub fn not_found(&self) -> Result<String> {
        self.renderer.render("not_found.html", &self.base_context())
    }
}

/// Turn `post.loading` style keys into nested objects for `labels.post.loading`
fn nest_labels(flat: &HashMap<String, String>) -> serde_json::Value {
    let mut keys: Vec<&String> = flat.keys().collect();
    keys.sort();

    let mut root = serde_json::Map::new();
    for key in keys {
        let parts: Vec<&str> = key.split('.').collect();
        if !insert_label(&mut root, &parts, &flat[key]) {
            tracing::debug!("Label {} conflicts with a shorter key", key);
        }
    }
    serde_json::Value::Object(root)
}

fn insert_label(
    map: &mut serde_json::Map<String, serde_json::Value>,
    parts: &[&str],
    value: &str,
) -> bool {
    match parts {
        [] => false,
        [leaf] => {
            map.entry(leaf.to_string())
                .or_insert_with(|| serde_json::Value::String(value.to_string()));
            true
        }
        [head, rest @ ..] => {
            let child = map
                .entry(head.to_string())
                .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
            match child {
                serde_json::Value::Object(child) => insert_label(child, rest, value),
                _ => false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::rich_text::{RichTextBlock, Span, SpanKind};
    use crate::content::timestamp;
    use crate::content::{ContentBlock, Cursor, PostSummary, PostsPage};

    fn renderer(language: &str) -> PageRenderer {
        let config = SiteConfig {
            language: language.to_string(),
            ..SiteConfig::default()
        };
        PageRenderer::new(&config, &I18n::new(language)).unwrap()
    }

    fn summary(uid: &str, date: Option<&str>) -> PostSummary {
        PostSummary {
            uid: uid.to_string(),
            publication_date: date.and_then(timestamp::parse),
            title: format!("Title {}", uid),
            subtitle: "Sub".to_string(),
            author: "Joseph Oliveira".to_string(),
        }
    }

    fn detail() -> PostDetail {
        PostDetail {
            uid: "como-utilizar-hooks".to_string(),
            publication_date: timestamp::parse("2021-03-15T19:25:28+0000"),
            title: "Como utilizar Hooks".to_string(),
            banner_url: Some("https://images.prismic.io/banner.png".to_string()),
            author: "Joseph Oliveira".to_string(),
            content: vec![
                ContentBlock::new(
                    "Proin et varius",
                    vec![RichTextBlock::paragraph("Nullam dolor sapien, vulputate eu diam at")
                        .with_span(Span::new(SpanKind::Strong, 0, 6))],
                ),
                ContentBlock::new("", vec![RichTextBlock::paragraph("<script>x</script>")]),
            ],
        }
    }

    #[test]
    fn test_post_page() {
        let html = renderer("pt-BR").post(&detail()).unwrap();

        let banner = html.find("images.prismic.io/banner.png").unwrap();
        let title = html.find("<h1>Como utilizar Hooks</h1>").unwrap();
        assert!(banner < title);
        assert!(html.contains(r#"<time datetime="2021-03-15T19:25:28+00:00">15 mar 2021</time>"#));
        assert!(html.contains("1 min"));
        assert!(html.contains(r#"<section id="section-0" class="content">"#));
        assert!(html.contains("<h2>Proin et varius</h2>"));
        assert!(html.contains(
            r#"<link rel="canonical" href="http://localhost:4000/post/como-utilizar-hooks/">"#
        ));
        assert!(html.contains("<strong>Nullam</strong>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>x"));
    }

    #[test]
    fn test_post_without_date_omits_time() {
        let mut post = detail();
        post.publication_date = None;
        let html = renderer("pt-BR").post(&post).unwrap();
        assert!(!html.contains("<time"));
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let pages = renderer("pt-BR");
        let post = detail();
        assert_eq!(pages.post(&post).unwrap(), pages.post(&post).unwrap());
    }

    #[test]
    fn test_list_with_more_pages() {
        let state = PaginationState::new(PostsPage {
            results: vec![
                summary("p1", Some("2021-03-25T19:25:28+0000")),
                summary("p2", None),
            ],
            next_page: Cursor::new("https://cms.dev/api/v2/documents/search?page=2"),
        });
        let html = renderer("pt-BR").list(&state, 1).unwrap();

        assert!(html.contains(r#"href="/post/p1/""#));
        assert!(html.contains("25 mar 2021"));
        assert!(html.contains(r#"href="/?pages=2""#));
        assert!(html.contains("Carregar mais posts"));
        assert!(html.contains("<title>Spacetraveling | Home</title>"));
    }

    #[test]
    fn test_list_exhausted_has_no_load_more() {
        let state = PaginationState::new(PostsPage {
            results: vec![summary("p1", None)],
            next_page: None,
        });
        let html = renderer("en").list(&state, 2).unwrap();
        assert!(!html.contains("load-more"));
        assert!(!html.contains("Load more posts"));
    }

    #[test]
    fn test_empty_list() {
        let html = renderer("en").list(&PaginationState::default(), 1).unwrap();
        assert!(html.contains("No posts published yet."));
    }

    #[test]
    fn test_loading_and_not_found() {
        let pages = renderer("pt-BR");
        let loading = pages.loading("novo-post").unwrap();
        assert!(loading.contains("Carregando..."));
        assert!(loading.contains(r#"<meta http-equiv="refresh" content="2">"#));

        let not_found = renderer("en").not_found().unwrap();
        assert!(not_found.contains("Page not found"));
    }

    #[test]
    fn test_nest_labels() {
        let mut flat = HashMap::new();
        flat.insert("post.loading".to_string(), "Loading...".to_string());
        flat.insert("footer".to_string(), "Footer".to_string());
        let nested = nest_labels(&flat);
        assert_eq!(nested["post"]["loading"], "Loading...");
        assert_eq!(nested["footer"], "Footer");
    }
}
