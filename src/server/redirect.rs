// HTTP-to-HTTPS redirect module
// When redirection is enabled the plain HTTP port serves nothing but
// 301s pointing at the HTTPS endpoint.

use std::convert::Infallible;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use crate::http::{self, response};
use crate::logger;

/// Accept connections forever and answer every request with a redirect
pub async fn serve_redirect(listener: TcpListener, https_port: u16) {
    loop {
        match listener.accept().await {
            Ok((stream, _peer)) => {
                tokio::spawn(async move {
                    let service = service_fn(move |req| async move {
                        Ok::<_, Infallible>(redirect_response(&req, https_port))
                    });
                    let result = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                    if let Err(e) = result {
                        logger::log_connection_error(&e);
                    }
                });
            }
            Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
        }
    }
}

/// Build the redirect, preserving the request host and path
fn redirect_response<B>(req: &Request<B>, https_port: u16) -> Response<http::Body> {
    let host = req
        .headers()
        .get("host")
        .and_then(|v| v.to_str().ok())
        .map_or("localhost", |h| h.split(':').next().unwrap_or(h));
    let path = req.uri().path();
    let location = if https_port == 443 {
        format!("https://{host}{path}")
    } else {
        format!("https://{host}:{https_port}{path}")
    };
    response::https_redirect(&location)
}
