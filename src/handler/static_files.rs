//! Static file serving module
//!
//! Resolves request paths to files under the server root, renders archive
//! pages, answers conditional requests, and streams file bytes.

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hyper::Response;
use tokio::fs;

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http::{self, headers, mime, response};
use crate::logger;

/// Path segment marking a server-rendered archive page
const ARCHIVE_SEGMENT: &str = "/archive/";

/// Serve a request by local file resolution.
///
/// Stat must complete before any header is derived from its result; a
/// failed stat (or a non-regular file) falls through to the 404 page.
pub async fn serve(ctx: &RequestContext<'_>, state: &Arc<AppState>) -> Response<http::Body> {
    let Some(file_path) = resolve_path(state, ctx.path) else {
        return serve_not_found_page(state, None).await;
    };

    let stat = match fs::metadata(&file_path).await {
        Ok(stat) if stat.is_file() => stat,
        Ok(_) | Err(_) => return serve_not_found_page(state, None).await,
    };

    // Secondary guard once the target exists: symlinks must not escape
    // the server root
    if !is_within_root(&state.root, &file_path) {
        logger::log_warning(&format!("Path traversal attempt blocked: {}", ctx.path));
        return serve_not_found_page(state, None).await;
    }

    // Archive pages are rendered on the server
    if ctx.path.contains(ARCHIVE_SEGMENT) {
        return serve_archive_page(ctx, state, &file_path, &stat).await;
    }

    // Conditional GET: an exact HTTP-date match answers 304
    if let (Some(since), Some(modified)) = (
        ctx.if_modified_since.as_deref(),
        headers::last_modified(&stat),
    ) {
        if since == modified {
            return response::not_modified();
        }
    }

    serve_file_stream(ctx, state, &file_path, &stat).await
}

/// Stream the pre-rendered 404 page.
///
/// The status is 200, not 404; see `response::not_found_page`. The stat
/// (when present) belongs to the originally requested file.
pub async fn serve_not_found_page(
    state: &AppState,
    stat: Option<&Metadata>,
) -> Response<http::Body> {
    match fs::File::open(&state.not_found_page).await {
        Ok(file) => response::not_found_page(file, stat),
        Err(e) => {
            logger::log_error(&format!(
                "Cannot open 404 page '{}': {e}",
                state.not_found_page.display()
            ));
            response::html_page(String::new(), None)
        }
    }
}

/// Map a request path to a file under the server root. `/` resolves to
/// the configured index page. Parent references are stripped outright.
fn resolve_path(state: &AppState, path: &str) -> Option<PathBuf> {
    if path == "/" {
        return Some(state.root.join(&state.config.resource_path.index_page));
    }
    let clean = path.trim_start_matches('/').replace("..", "");
    if clean.is_empty() {
        return None;
    }
    Some(state.root.join(clean))
}

fn is_within_root(root: &Path, path: &Path) -> bool {
    match (root.canonicalize(), path.canonicalize()) {
        (Ok(root), Ok(path)) => path.starts_with(root),
        _ => false,
    }
}

/// Render an archive article into the view template
async fn serve_archive_page(
    ctx: &RequestContext<'_>,
    state: &AppState,
    file_path: &Path,
    stat: &Metadata,
) -> Response<http::Body> {
    let title = ctx
        .path
        .split_once(ARCHIVE_SEGMENT)
        .map_or("", |(_, rest)| rest);
    match state.view_page.render(file_path, title).await {
        Ok(page) => {
            if ctx.access_log {
                logger::log_response(page.len());
            }
            response::html_page(page, Some(stat))
        }
        Err(e) => {
            logger::log_error(&format!(
                "Failed to render archive page '{}': {e}",
                file_path.display()
            ));
            serve_not_found_page(state, Some(stat)).await
        }
    }
}

/// Stream a static file's bytes directly to the client
async fn serve_file_stream(
    ctx: &RequestContext<'_>,
    state: &AppState,
    file_path: &Path,
    stat: &Metadata,
) -> Response<http::Body> {
    match fs::File::open(file_path).await {
        Ok(file) => {
            if ctx.access_log {
                logger::log_response(usize::try_from(stat.len()).unwrap_or(usize::MAX));
            }
            // extension of the resolved file, so `/` picks up the index
            // page's type instead of the fallback
            let extension = file_path.to_str().and_then(mime::extension);
            response::streamed_file(file, extension, stat)
        }
        // the file vanished between stat and open
        Err(e) => {
            logger::log_error(&format!(
                "Failed to open file '{}': {e}",
                file_path.display()
            ));
            serve_not_found_page(state, Some(stat)).await
        }
    }
}
