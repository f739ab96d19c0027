//! The capability gateway: the boundary through which the palette reaches the operating system and the network.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::{
    config::CapabilitiesConfig,
    errors::{Result, UserFacingError},
    model::{Application, Effect, Snippet},
};

mod apps;
mod calc;
mod clipboard;
mod effect;
mod files;
mod snippets;
mod translate;

pub use clipboard::ClipboardHistory;

/// Operations and data sources the palette depends on.
///
/// Every call is fallible, callers degrade failures into empty results instead of propagating them.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Lists the installed applications, sorted by name
    async fn list_applications(&self) -> Result<Vec<Application>>;

    /// Lists the available snippets, sorted by name
    async fn list_snippets(&self) -> Result<Vec<Snippet>>;

    /// Retrieves the recent clipboard texts, oldest first
    async fn clipboard_history(&self) -> Result<Vec<String>>;

    /// Evaluates an arithmetic expression into a finite number
    async fn evaluate_expression(&self, expression: &str) -> Result<f64>;

    /// Searches local files whose name resembles the term, best match first
    async fn search_files(&self, term: &str) -> Result<Vec<String>>;

    /// Translates a sentence between the given languages (`auto` detects the source one)
    async fn translate(&self, sentence: &str, from: &str, to: &str) -> Result<String>;

    /// Runs an effector
    async fn invoke(&self, effect: Effect) -> Result<()>;
}

/// [`Gateway`] backed by the current operating system
pub struct SystemGateway {
    config: CapabilitiesConfig,
    http: reqwest::Client,
    clipboard: ClipboardHistory,
}

impl SystemGateway {
    /// Builds a new gateway, its clipboard history stays empty until [`Self::watch_clipboard`] is called
    pub fn new(config: CapabilitiesConfig) -> Self {
        let clipboard = ClipboardHistory::new(config.clipboard_history_size);
        Self {
            config,
            http: reqwest::Client::new(),
            clipboard,
        }
    }

    /// Starts recording the clipboard history, until the token is cancelled
    pub fn watch_clipboard(self, cancellation_token: CancellationToken) -> Self {
        self.clipboard
            .spawn_poller(Duration::from_millis(self.config.clipboard_poll), cancellation_token);
        self
    }
}

#[async_trait]
impl Gateway for SystemGateway {
    #[instrument(skip_all)]
    async fn list_applications(&self) -> Result<Vec<Application>> {
        let dirs = self.config.application_dirs.clone();
        let apps = tokio::task::spawn_blocking(move || apps::scan_applications(&dirs)).await?;
        tracing::debug!("Found {} applications", apps.len());
        Ok(apps)
    }

    #[instrument(skip_all)]
    async fn list_snippets(&self) -> Result<Vec<Snippet>> {
        snippets::read_snippets(&self.config.snippets_dir).await
    }

    async fn clipboard_history(&self) -> Result<Vec<String>> {
        self.clipboard.snapshot()
    }

    #[instrument(skip(self))]
    async fn evaluate_expression(&self, expression: &str) -> Result<f64> {
        calc::evaluate(expression)
    }

    #[instrument(skip(self))]
    async fn search_files(&self, term: &str) -> Result<Vec<String>> {
        if self.config.file_search_roots.is_empty() {
            return Err(UserFacingError::FileSearchFailed(String::from("no search roots configured")).into());
        }
        let roots = self.config.file_search_roots.clone();
        let term = term.to_owned();
        let limit = self.config.file_search_limit;
        let threshold = self.config.file_search_threshold;
        let found =
            tokio::task::spawn_blocking(move || files::search_files(&roots, &term, limit, threshold)).await?;
        tracing::debug!("Found {} files", found.len());
        Ok(found)
    }

    #[instrument(skip(self))]
    async fn translate(&self, sentence: &str, from: &str, to: &str) -> Result<String> {
        translate::translate(&self.http, &self.config.translate_url, sentence, from, to).await
    }

    #[instrument(skip(self))]
    async fn invoke(&self, effect: Effect) -> Result<()> {
        effect::run(&self.config, effect).await
    }
}
