// Connection handling module
// Accept loops for the plain and TLS listeners; each accepted stream is
// served on its own task.

use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

use crate::config::AppState;
use crate::error::ServerError;
use crate::handler;
use crate::logger;

/// Accept connections forever and serve the content router on each
pub async fn serve_plain(listener: TcpListener, state: Arc<AppState>) {
    loop {
        match listener.accept().await {
            Ok((stream, _peer)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    serve_stream(TokioIo::new(stream), state).await;
                });
            }
            Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
        }
    }
}

/// Accept connections forever, complete the TLS handshake, then serve
/// the content router
pub async fn serve_tls(listener: TcpListener, acceptor: TlsAcceptor, state: Arc<AppState>) {
    loop {
        match listener.accept().await {
            Ok((stream, _peer)) => {
                let acceptor = acceptor.clone();
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    match acceptor.accept(stream).await {
                        Ok(tls_stream) => serve_stream(TokioIo::new(tls_stream), state).await,
                        Err(e) => logger::log_warning(&format!("TLS handshake failed: {e}")),
                    }
                });
            }
            Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
        }
    }
}

/// Serve one HTTP/1.1 connection with the request router
async fn serve_stream<I>(io: I, state: Arc<AppState>)
where
    I: hyper::rt::Read + hyper::rt::Write + Unpin + Send + 'static,
{
    let service = service_fn(move |req| handler::handle_request(req, Arc::clone(&state)));
    let result = http1::Builder::new().serve_connection(io, service).await;
    log_serve_result(result);
}

/// Requests the router deliberately leaves unanswered abort the
/// connection before any bytes are written; those are not connection
/// errors.
fn log_serve_result(result: Result<(), hyper::Error>) {
    if let Err(err) = result {
        let ignored = std::error::Error::source(&err)
            .and_then(|cause| cause.downcast_ref::<ServerError>())
            .is_some_and(|cause| matches!(cause, ServerError::Ignored(_)));
        if !ignored {
            logger::log_connection_error(&err);
        }
    }
}
