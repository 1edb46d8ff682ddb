//! spacetraveling: a static blog front end backed by a headless CMS
//!
//! Post summaries and posts are read from a Prismic-style REST API, rendered
//! with embedded Tera templates and written to a public directory. The
//! listing page grows by following the CMS page cursor.

pub mod cms;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod pagination;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cms::{ContentSource, PrismicClient};
use crate::generator::{GenerateReport, Generator};

/// File holding the site configuration inside the base directory
pub const CONFIG_FILE: &str = "_config.yml";

/// A site directory and its configuration
#[derive(Debug, Clone)]
pub struct Site {
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Directory of label overrides
    pub i18n_dir: PathBuf,
}

impl Site {
    /// Open a site directory; environment overrides are applied on top of
    /// `_config.yml`, defaults are used when the file is absent
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No {} in {:?}, using defaults", CONFIG_FILE, base_dir);
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self::with_config(base_dir, config))
    }

    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);
        let i18n_dir = base_dir.join(&config.i18n_dir);
        Self {
            config,
            base_dir,
            public_dir,
            i18n_dir,
        }
    }

    /// Labels for the configured language, including overrides on disk
    pub fn i18n(&self) -> Result<i18n::I18n> {
        let mut i18n = i18n::I18n::new(&self.config.language);
        i18n.load_languages(&self.i18n_dir)?;
        Ok(i18n)
    }

    /// Client for the configured CMS
    pub fn content_source(&self) -> Result<Arc<dyn ContentSource>> {
        Ok(Arc::new(PrismicClient::new(&self.config.cms)?))
    }

    /// Generate the static site from the configured CMS
    pub async fn generate(&self) -> Result<GenerateReport> {
        let generator = Generator::new(self, self.content_source()?)?;
        generator.generate().await
    }

    /// Remove the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
