// Server module entry point
// Binds listeners per configuration and drives the accept loops

mod connection;
mod listener;
mod redirect;

use std::sync::Arc;

use tokio_rustls::TlsAcceptor;

use crate::config::AppState;
use crate::logger;
use crate::tls::TlsOptions;

/// Bind listeners per configuration and run until terminated
pub async fn run(state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let acceptor = build_acceptor(&state).await;

    if let Some(acceptor) = acceptor {
        let https_addr = state.config.https_addr();
        let https_listener = listener::create_reusable_listener(https_addr)?;
        logger::log_https_start(&https_addr);
        tokio::spawn(connection::serve_tls(
            https_listener,
            acceptor,
            Arc::clone(&state),
        ));

        if state.config.server.redirect_http_to_https {
            let http_addr = state.config.http_addr();
            let http_listener = listener::create_reusable_listener(http_addr)?;
            logger::log_redirect_start(&http_addr);
            redirect::serve_redirect(http_listener, state.config.server.https_port).await;
            return Ok(());
        }
    }

    let http_addr = state.config.http_addr();
    let http_listener = listener::create_reusable_listener(http_addr)?;
    logger::log_server_start(&http_addr, &state.config);
    connection::serve_plain(http_listener, state).await;
    Ok(())
}

/// Load TLS credentials when HTTPS is enabled.
///
/// Any failure is logged and leaves the HTTPS listener unstarted; the
/// plain HTTP listener still runs. HTTPS never starts from a partially
/// loaded credential set.
async fn build_acceptor(state: &AppState) -> Option<TlsAcceptor> {
    if !state.config.server.enable_https {
        return None;
    }
    let Some(paths) = &state.config.https_options else {
        logger::log_error("HTTPS enabled but https_options missing; not starting HTTPS listener");
        return None;
    };
    let result = match TlsOptions::load(paths).await {
        Ok(options) => options.acceptor(),
        Err(e) => Err(e),
    };
    match result {
        Ok(acceptor) => Some(acceptor),
        Err(e) => {
            logger::log_error(&format!("Not starting HTTPS listener: {e}"));
            None
        }
    }
}
