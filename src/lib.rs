//! Directory resource server library.
//!
//! Maps request paths onto a filesystem subtree confined to a root
//! directory: single files stream with cache-validation headers and correct
//! HEAD/GET semantics, directories serve a welcome file when one exists, and
//! render a listing otherwise. Usable as a standalone binary or embedded in
//! another axum application.

pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod listing;
pub mod render;
pub mod resolve;
pub mod routes;
pub mod stream;

use std::path::PathBuf;
use std::sync::Arc;

pub use config::Config;
pub use error::ServeError;

use render::TemplateRenderer;
use stream::{ContentTypeResolver, GuessContentType};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Canonical root directory; every resolved path must stay inside it
    pub root_dir: PathBuf,
    /// Configuration
    pub config: Arc<Config>,
    /// Template engine for rendered listings, when one is installed
    pub templates: Option<Arc<dyn TemplateRenderer>>,
    /// Content-type lookup used when streaming files
    pub content_types: Arc<dyn ContentTypeResolver>,
}

impl AppState {
    /// Create a new AppState with the given root directory and default config.
    pub fn new(root_dir: PathBuf) -> Self {
        Self::with_config(root_dir, Config::default())
    }

    /// Create a new AppState with the given root directory and config.
    pub fn with_config(root_dir: PathBuf, config: Config) -> Self {
        Self {
            root_dir,
            config: Arc::new(config),
            templates: None,
            content_types: Arc::new(GuessContentType),
        }
    }

    /// Install a template engine for template-mode directory listings.
    pub fn with_templates(mut self, templates: Arc<dyn TemplateRenderer>) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Replace the content-type lookup.
    pub fn with_content_types(mut self, content_types: Arc<dyn ContentTypeResolver>) -> Self {
        self.content_types = content_types;
        self
    }
}
