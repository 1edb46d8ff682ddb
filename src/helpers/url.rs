//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::SiteConfig;

/// Characters escaped inside a single path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'&')
    .add(b'\'');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/post/hello/") // -> "/blog/post/hello/"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// URL of a post detail page
pub fn post_url(config: &SiteConfig, uid: &str) -> String {
    url_for(config, &format!("post/{}/", encode_segment(uid)))
}

/// URL of the listing page showing `pages` pages
pub fn list_url(config: &SiteConfig, pages: usize) -> String {
    if pages <= 1 {
        url_for(config, "")
    } else {
        format!("{}?pages={}", url_for(config, ""), pages)
    }
}

/// Percent-encode a single path segment
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Whether a uid can be used as a directory name under `post/`
pub fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\'])
        && !segment.chars().any(char::is_control)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.url = "https://example.com".to_string();
        config.root = "/blog/".to_string();
        config
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/post/a/"), "/blog/post/a/");
        assert_eq!(url_for(&config, ""), "/blog/");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, "/post/a/"),
            "https://example.com/blog/post/a/"
        );
    }

    #[test]
    fn test_post_url_encodes_uid() {
        let config = SiteConfig::default();
        assert_eq!(post_url(&config, "como-utilizar-hooks"), "/post/como-utilizar-hooks/");
        assert_eq!(post_url(&config, "a b?c"), "/post/a%20b%3Fc/");
    }

    #[test]
    fn test_list_url() {
        let config = SiteConfig::default();
        assert_eq!(list_url(&config, 1), "/");
        assert_eq!(list_url(&config, 3), "/?pages=3");
    }

    #[test]
    fn test_safe_segment() {
        assert!(is_safe_segment("criando-um-app-cra-do-zero"));
        assert!(!is_safe_segment(".."));
        assert!(!is_safe_segment("a/b"));
        assert!(!is_safe_segment(""));
    }
}
