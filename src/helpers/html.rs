//! HTML helper functions

use super::url::url_for;
use crate::config::SiteConfig;

/// Generate an image tag
///
/// # Examples
/// ```ignore
/// image_tag(&config, "https://images.prismic.io/banner.png", Some("banner"))
/// ```
pub fn image_tag(config: &SiteConfig, path: &str, alt: Option<&str>) -> String {
    let src = if is_external(path) {
        path.to_string()
    } else {
        url_for(config, path)
    };

    format!(
        r#"<img src="{}" alt="{}">"#,
        html_escape(&src),
        html_escape(alt.unwrap_or(""))
    )
}

/// Generate a refresh meta tag used by fallback pages
pub fn meta_refresh(seconds: u32) -> String {
    format!(r#"<meta http-equiv="refresh" content="{}">"#, seconds)
}

/// Generate meta generator tag
pub fn meta_generator() -> String {
    format!(
        r#"<meta name="generator" content="spacetraveling {}">"#,
        env!("CARGO_PKG_VERSION")
    )
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn is_external(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_tag() {
        let config = SiteConfig::default();
        assert_eq!(
            image_tag(&config, "https://images.prismic.io/a.png?w=100&h=50", Some("logo")),
            r#"<img src="https://images.prismic.io/a.png?w=100&amp;h=50" alt="logo">"#
        );
        assert_eq!(
            image_tag(&config, "img/a.png", None),
            r#"<img src="/img/a.png" alt="">"#
        );
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn test_meta_refresh() {
        assert_eq!(meta_refresh(2), r#"<meta http-equiv="refresh" content="2">"#);
    }
}
