//! Request routing dispatch module
//!
//! Entry point for HTTP request processing. Each GET request resolves to
//! exactly one terminal outcome: an API response, a pjax article payload,
//! a rendered archive page, a static file stream, or the 404 page.
//! Non-GET requests and unknown API paths are left unanswered; the
//! connection layer closes the socket without writing a response.

use std::sync::Arc;

use hyper::{Method, Request, Response};

use crate::config::AppState;
use crate::error::ServerError;
use crate::handler::static_files;
use crate::http::{self, response};
use crate::logger;

/// Signal header sent by the client-side pjax loader
const PJAX_HEADER: &str = "pushstate-ajax";

/// Request context encapsulating the information routing needs
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_pjax: bool,
    pub if_modified_since: Option<String>,
    pub access_log: bool,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<http::Body>, ServerError> {
    let method = req.method();
    let path = req.uri().path();

    let access_log = state.config.logging.access_log;
    if access_log {
        logger::log_request(method, req.uri());
    }

    // Only GET is served; everything else closes without a body
    if *method != Method::GET {
        return Err(ServerError::Ignored(format!("{method} {path}")));
    }

    let ctx = RequestContext {
        path,
        is_pjax: req.headers().contains_key(PJAX_HEADER),
        if_modified_since: req
            .headers()
            .get("if-modified-since")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string),
        access_log,
    };

    route_request(&ctx, &state).await
}

/// Dispatch a request: `/api/` before pjax before static resolution
async fn route_request(
    ctx: &RequestContext<'_>,
    state: &Arc<AppState>,
) -> Result<Response<http::Body>, ServerError> {
    if ctx.path.contains("/api/") {
        return serve_api(ctx, state).await;
    }
    if ctx.is_pjax {
        return Ok(serve_pjax(ctx, state).await);
    }
    Ok(static_files::serve(ctx, state).await)
}

async fn serve_api(
    ctx: &RequestContext<'_>,
    state: &Arc<AppState>,
) -> Result<Response<http::Body>, ServerError> {
    match ctx.path {
        "/api/archive-list" => {
            let list = state.archive.summary_list().await;
            Ok(response::json_value(&list))
        }
        "/api/music-record" => {
            // opaque passthrough of the music client's serialized record
            Ok(response::json(state.music.record().await))
        }
        _ => Err(ServerError::Ignored(format!(
            "unknown api path {}",
            ctx.path
        ))),
    }
}

/// pjax request: the path names an archive file. Responds with the
/// article payload, or 404 carrying the underlying error message.
async fn serve_pjax(ctx: &RequestContext<'_>, state: &Arc<AppState>) -> Response<http::Body> {
    match state.archive.detail(basename(ctx.path)).await {
        Ok(detail) => response::json_value(&detail),
        Err(e) => response::not_found_text(&e.to_string()),
    }
}

/// Final path segment
fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        AddonsConfig, Config, LoggingConfig, NeteaseConfig, ResourcePathConfig, ServerConfig,
    };
    use http_body_util::{BodyExt, Empty};
    use hyper::body::Bytes;

    /// Build a server root with pages, one archive article, and one
    /// static asset, then initialize state on it.
    async fn test_state() -> (tempfile::TempDir, Arc<AppState>) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        std::fs::create_dir_all(root.join("page")).unwrap();
        std::fs::create_dir_all(root.join("archive")).unwrap();
        std::fs::create_dir_all(root.join("static")).unwrap();
        std::fs::write(root.join("page/404.html"), "<h1>404 v${server.version}</h1>").unwrap();
        std::fs::write(
            root.join("page/view.html"),
            "<title>${article.title}</title><pre>${article.content}</pre>",
        )
        .unwrap();
        std::fs::write(root.join("page/index.html"), "<h1>index</h1>").unwrap();
        std::fs::write(root.join("archive/hello.txt"), "Hello\n\nworld").unwrap();
        std::fs::write(root.join("static/app.css"), "body{}").unwrap();

        let config = Config {
            server: ServerConfig {
                port: 8080,
                https_port: 8443,
                enable_https: false,
                redirect_http_to_https: false,
            },
            resource_path: ResourcePathConfig {
                not_found_page: "page/404.html".to_string(),
                view_page: "page/view.html".to_string(),
                index_page: "page/index.html".to_string(),
                archive: "archive".to_string(),
            },
            addons: AddonsConfig {
                netease: NeteaseConfig {
                    uid: 1,
                    expire_time_secs: 3600,
                },
            },
            https_options: None,
            logging: LoggingConfig {
                access_log: false,
                access_log_file: None,
                error_log_file: None,
            },
        };
        let state = AppState::init(config, root).await.unwrap();
        (dir, Arc::new(state))
    }

    fn get(uri: &str) -> Request<Empty<Bytes>> {
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Empty::new())
            .unwrap()
    }

    async fn body_string(response: Response<http::Body>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_non_get_is_ignored() {
        let (_dir, state) = test_state().await;
        let req = Request::builder()
            .method(Method::DELETE)
            .uri("/")
            .body(Empty::<Bytes>::new())
            .unwrap();
        let result = handle_request(req, state).await;
        assert!(matches!(result, Err(ServerError::Ignored(_))));
    }

    #[tokio::test]
    async fn test_archive_list_length_matches_directory() {
        let (_dir, state) = test_state().await;
        let response = handle_request(get("/api/archive-list"), state).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "application/json"
        );
        let list: Vec<serde_json::Value> =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["fileName"], "hello.txt");
        assert_eq!(list[0]["title"], "Hello");
    }

    #[tokio::test]
    async fn test_unknown_api_path_is_ignored() {
        let (_dir, state) = test_state().await;
        let result = handle_request(get("/api/unknown"), state).await;
        assert!(matches!(result, Err(ServerError::Ignored(_))));
    }

    #[tokio::test]
    async fn test_pjax_returns_article_detail() {
        let (_dir, state) = test_state().await;
        let req = Request::builder()
            .method(Method::GET)
            .uri("/archive/hello.txt")
            .header("Pushstate-Ajax", "true")
            .body(Empty::<Bytes>::new())
            .unwrap();
        let response = handle_request(req, state).await.unwrap();
        assert_eq!(response.status(), 200);
        let detail: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(detail["fileName"], "hello.txt");
        assert_eq!(detail["content"], "Hello\n\nworld");
    }

    #[tokio::test]
    async fn test_pjax_missing_article_is_404_with_message() {
        let (_dir, state) = test_state().await;
        let req = Request::builder()
            .method(Method::GET)
            .uri("/archive/nope.txt")
            .header("pushstate-ajax", "true")
            .body(Empty::<Bytes>::new())
            .unwrap();
        let response = handle_request(req, state).await.unwrap();
        assert_eq!(response.status(), 404);
        assert!(!body_string(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_api_takes_precedence_over_pjax() {
        let (_dir, state) = test_state().await;
        let req = Request::builder()
            .method(Method::GET)
            .uri("/api/archive-list")
            .header("pushstate-ajax", "true")
            .body(Empty::<Bytes>::new())
            .unwrap();
        let response = handle_request(req, state).await.unwrap();
        assert_eq!(response.status(), 200);
        let body = body_string(response).await;
        assert!(body.starts_with('['));
    }

    #[tokio::test]
    async fn test_archive_page_is_rendered_html() {
        let (_dir, state) = test_state().await;
        let response = handle_request(get("/archive/hello.txt"), state).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "text/html; charset=utf-8"
        );
        let body = body_string(response).await;
        assert_eq!(body, "<title>hello.txt</title><pre>Hello\n\nworld</pre>");
    }

    #[tokio::test]
    async fn test_root_serves_index_page() {
        let (_dir, state) = test_state().await;
        let response = handle_request(get("/"), state).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(body_string(response).await, "<h1>index</h1>");
    }

    #[tokio::test]
    async fn test_static_file_stream_and_conditional_get() {
        let (_dir, state) = test_state().await;
        let first = handle_request(get("/static/app.css"), Arc::clone(&state))
            .await
            .unwrap();
        assert_eq!(first.status(), 200);
        assert_eq!(first.headers().get("Content-Type").unwrap(), "text/css");
        let modified = first
            .headers()
            .get("Last-Modified")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert_eq!(body_string(first).await, "body{}");

        let req = Request::builder()
            .method(Method::GET)
            .uri("/static/app.css")
            .header("if-modified-since", &modified)
            .body(Empty::<Bytes>::new())
            .unwrap();
        let second = handle_request(req, state).await.unwrap();
        assert_eq!(second.status(), 304);
        assert!(body_string(second).await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_path_serves_404_page_with_status_200() {
        let (_dir, state) = test_state().await;
        let response = handle_request(get("/does/not/exist.html"), state)
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body = body_string(response).await;
        assert!(body.contains("404"));
        assert!(body.contains(env!("CARGO_PKG_VERSION")));
    }

    #[tokio::test]
    async fn test_unknown_extension_streams_with_default_type() {
        let (dir, state) = test_state().await;
        std::fs::write(dir.path().join("static/blob.xyz"), b"data").unwrap();
        let response = handle_request(get("/static/blob.xyz"), state).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "application/octet-stream"
        );
    }
}
