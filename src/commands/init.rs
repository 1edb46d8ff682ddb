//! Initialize a new site directory

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::config::{SiteConfig, ACCESS_TOKEN_ENV, ENDPOINT_ENV};
use crate::CONFIG_FILE;

fn default_config() -> String {
    let defaults = SiteConfig::default();
    format!(
        r#"# Site
title: {title}
language: {language}
timezone: ''

# URL
url: {url}
root: /

# Directory
public_dir: {public_dir}
i18n_dir: {i18n_dir}

# Date format (date-fns tokens)
date_format: {date_format}

# Posts on the first page, and per "load more"
per_page: {per_page}

# Reading time
words_per_minute: {words_per_minute}

# Content source
# {endpoint_env} and {token_env} override these values
cms:
  endpoint: ''
  access_token:
  document_type: {document_type}
"#,
        title = defaults.title,
        language = defaults.language,
        url = defaults.url,
        public_dir = defaults.public_dir,
        i18n_dir = defaults.i18n_dir,
        date_format = defaults.date_format,
        per_page = defaults.per_page,
        words_per_minute = defaults.words_per_minute,
        endpoint_env = ENDPOINT_ENV,
        token_env = ACCESS_TOKEN_ENV,
        document_type = defaults.cms.document_type,
    )
}

/// Initialize a new site in the given directory
///
/// An existing `_config.yml` is left untouched.
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)
        .with_context(|| format!("failed to create {:?}", target_dir))?;

    let defaults = SiteConfig::default();
    fs::create_dir_all(target_dir.join(&defaults.i18n_dir))?;

    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        tracing::warn!("{:?} already exists, keeping it", config_path);
    } else {
        fs::write(&config_path, default_config())?;
        tracing::info!("Created {:?}", config_path);
    }

    let gitignore = target_dir.join(".gitignore");
    if !gitignore.exists() {
        fs::write(&gitignore, format!("{}/\n", defaults.public_dir))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses_to_defaults() {
        let config: SiteConfig = serde_yaml::from_str(&default_config()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.title, defaults.title);
        assert_eq!(config.language, "pt-BR");
        assert_eq!(config.date_format, "dd MMM yyyy");
        assert_eq!(config.per_page, 3);
        assert_eq!(config.cms.document_type, "posts");
        assert_eq!(config.cms.access_token, None);
    }

    #[test]
    fn test_init_site_keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();
        assert!(dir.path().join(CONFIG_FILE).exists());
        assert!(dir.path().join("languages").is_dir());

        fs::write(dir.path().join(CONFIG_FILE), "title: Mine\n").unwrap();
        init_site(dir.path()).unwrap();
        let content = fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(content, "title: Mine\n");
    }
}
