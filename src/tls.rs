//! TLS credential loading module
//!
//! Reads the configured CA/key/cert files into memory and builds a rustls
//! acceptor from them. Loading is all-or-nothing: a single unreadable
//! file invalidates the whole set and the HTTPS listener is not started.

use std::io::BufReader;
use std::sync::Arc;

use tokio::fs;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::TlsAcceptor;

use crate::config::HttpsOptionsConfig;
use crate::error::ServerError;
use crate::logger;

/// Decoded TLS credential contents.
///
/// Either fully populated or absent; no server starts HTTPS from a
/// partial set.
#[derive(Debug, Clone)]
pub struct TlsOptions {
    pub ca: Option<String>,
    pub key: String,
    pub cert: String,
}

impl TlsOptions {
    /// Read all configured credential files concurrently.
    ///
    /// The returned future resolves exactly once: any read failure yields
    /// an error and no partially populated options escape.
    pub async fn load(paths: &HttpsOptionsConfig) -> Result<Self, ServerError> {
        let ca = async {
            match &paths.ca {
                Some(path) => read_credential(path).await.map(Some),
                None => Ok(None),
            }
        };
        let (ca, key, cert) = tokio::try_join!(
            ca,
            read_credential(&paths.key),
            read_credential(&paths.cert)
        )?;
        Ok(Self { ca, key, cert })
    }

    /// Build a rustls server config from the in-memory PEM contents
    pub fn server_config(&self) -> Result<ServerConfig, ServerError> {
        let certs: Vec<CertificateDer<'static>> =
            rustls_pemfile::certs(&mut BufReader::new(self.cert.as_bytes()))
                .collect::<Result<_, _>>()
                .map_err(|e| ServerError::Config(format!("invalid certificate: {e}")))?;
        let key: PrivateKeyDer<'static> =
            rustls_pemfile::private_key(&mut BufReader::new(self.key.as_bytes()))
                .map_err(|e| ServerError::Config(format!("invalid private key: {e}")))?
                .ok_or_else(|| {
                    ServerError::Config("no usable private key found".to_string())
                })?;
        ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(certs, key)
            .map_err(|e| ServerError::Config(format!("invalid https options config: {e}")))
    }

    pub fn acceptor(&self) -> Result<TlsAcceptor, ServerError> {
        if self.ca.is_some() {
            logger::log_warning("CA certificate loaded but client authentication is not enabled");
        }
        Ok(TlsAcceptor::from(Arc::new(self.server_config()?)))
    }
}

async fn read_credential(path: &str) -> Result<String, ServerError> {
    fs::read_to_string(path).await.map_err(|e| {
        ServerError::Config(format!(
            "invalid https options config: cannot read '{path}': {e}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let key = dir.path().join("server.key");
        let cert = dir.path().join("server.crt");
        std::fs::write(&key, "key contents").unwrap();
        std::fs::write(&cert, "cert contents").unwrap();

        let paths = HttpsOptionsConfig {
            ca: None,
            key: key.to_string_lossy().into_owned(),
            cert: cert.to_string_lossy().into_owned(),
        };
        let options = TlsOptions::load(&paths).await.unwrap();
        assert_eq!(options.key, "key contents");
        assert_eq!(options.cert, "cert contents");
        assert!(options.ca.is_none());
    }

    #[tokio::test]
    async fn test_one_unreadable_file_invalidates_the_set() {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("server.crt");
        std::fs::write(&cert, "cert contents").unwrap();

        let paths = HttpsOptionsConfig {
            ca: None,
            key: dir.path().join("missing.key").to_string_lossy().into_owned(),
            cert: cert.to_string_lossy().into_owned(),
        };
        let err = TlsOptions::load(&paths).await.unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
        assert!(err.to_string().contains("invalid https options config"));
    }

    #[test]
    fn test_garbage_pem_is_a_config_error() {
        let options = TlsOptions {
            ca: None,
            key: "not a pem".to_string(),
            cert: "not a pem".to_string(),
        };
        assert!(matches!(
            options.server_config(),
            Err(ServerError::Config(_))
        ));
    }
}
