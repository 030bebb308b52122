// Application state module
// Read-only state shared by all connections after startup

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs;

use super::types::Config;
use crate::archive::ArchiveStore;
use crate::error::ServerError;
use crate::music::MusicClient;
use crate::view::ViewPage;

/// Name of the pre-rendered 404 page written next to its template
const CURRENT_404_FILE: &str = "current404.html";
/// Placeholder in the 404 template replaced with the crate version
const VERSION_TOKEN: &str = "${server.version}";

/// Application state.
///
/// Everything except the music client's internal cache is immutable once
/// `init` returns, so no locks are needed across concurrent requests.
pub struct AppState {
    pub config: Config,
    pub root: PathBuf,
    pub view_page: ViewPage,
    /// Path of the pre-rendered 404 page, written during `init`
    pub not_found_page: PathBuf,
    pub archive: ArchiveStore,
    pub music: MusicClient,
}

impl AppState {
    /// Initialize all shared resources.
    ///
    /// Must complete before any listener binds, so early requests never
    /// observe a half-written 404 page. Missing templates abort startup
    /// instead of leaving the server running with empty pages.
    pub async fn init(config: Config, root: PathBuf) -> Result<Self, ServerError> {
        let template = fs::read_to_string(root.join(&config.resource_path.view_page))
            .await
            .map_err(|e| {
                ServerError::Config(format!(
                    "cannot read view template '{}': {e}",
                    config.resource_path.view_page
                ))
            })?;
        let view_page = ViewPage::new(template);

        let not_found_page =
            render_not_found_page(&root, &config.resource_path.not_found_page).await?;

        let archive = ArchiveStore::new(root.join(&config.resource_path.archive));
        let music = MusicClient::new(
            config.addons.netease.uid,
            Duration::from_secs(config.addons.netease.expire_time_secs),
        );

        Ok(Self {
            config,
            root,
            view_page,
            not_found_page,
            archive,
            music,
        })
    }
}

/// Substitute the server version into the 404 template and write the
/// rendered page next to it. Returns the rendered page's path.
async fn render_not_found_page(root: &Path, template_path: &str) -> Result<PathBuf, ServerError> {
    let template_path = root.join(template_path);
    let template = fs::read_to_string(&template_path).await.map_err(|e| {
        ServerError::Config(format!(
            "cannot read 404 template '{}': {e}",
            template_path.display()
        ))
    })?;
    let rendered = template.replacen(VERSION_TOKEN, env!("CARGO_PKG_VERSION"), 1);
    let out_path = template_path.with_file_name(CURRENT_404_FILE);
    fs::write(&out_path, rendered).await?;
    Ok(out_path)
}
