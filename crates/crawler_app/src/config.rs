use std::fs;
use std::path::Path;
use std::time::Duration;

use crawl_logging::{crawl_info, crawl_warn};
use crawler_core::DEFAULT_MAX_CONCURRENT;
use crawler_engine::{HttpSettings, RenderOptions};
use serde::Deserialize;

use crate::cli::Cli;

/// Settings read from the RON config file. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CrawlerSettings {
    pub max_concurrent: u32,
    pub ignore_links: bool,
    pub body_width: usize,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub user_agent: Option<String>,
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        let render = RenderOptions::default();
        let http = HttpSettings::default();
        Self {
            max_concurrent: u32::from(DEFAULT_MAX_CONCURRENT),
            ignore_links: render.ignore_links,
            body_width: render.body_width,
            connect_timeout_secs: http.connect_timeout.as_secs(),
            request_timeout_secs: http.request_timeout.as_secs(),
            redirect_limit: http.redirect_limit,
            max_bytes: http.max_bytes,
            user_agent: None,
        }
    }
}

impl CrawlerSettings {
    /// Read settings from `path`. A missing or unreadable file yields defaults.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Self::default();
            }
            Err(err) => {
                crawl_warn!("Failed to read settings from {:?}: {}", path, err);
                return Self::default();
            }
        };

        match ron::from_str(&content) {
            Ok(settings) => {
                crawl_info!("Loaded settings from {:?}", path);
                settings
            }
            Err(err) => {
                crawl_warn!("Failed to parse settings from {:?}: {}", path, err);
                Self::default()
            }
        }
    }

    /// Command-line flags win over the file.
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(max_concurrent) = cli.max_concurrent {
            self.max_concurrent = max_concurrent;
        }
        if cli.keep_links {
            self.ignore_links = false;
        }
        if let Some(width) = cli.body_width {
            self.body_width = width;
        }
        self
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            ignore_links: self.ignore_links,
            body_width: self.body_width,
        }
    }

    pub fn http_settings(&self) -> HttpSettings {
        let mut http = HttpSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            redirect_limit: self.redirect_limit,
            max_bytes: self.max_bytes,
            ..HttpSettings::default()
        };
        if let Some(agent) = &self.user_agent {
            http.user_agent = agent.clone();
        }
        http
    }
}
