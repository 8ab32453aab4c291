/*
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

use rustls::{ClientConfig, RootCertStore};

use super::super::TlsConfigError;

/// Built TLS client parameters, shared by every stream that uses them.
#[derive(Clone)]
pub struct TlsClientConfig {
    driver: Arc<ClientConfig>,
}

impl TlsClientConfig {
    pub fn builder() -> TlsClientConfigBuilder {
        TlsClientConfigBuilder::default()
    }

    pub(crate) fn driver(&self) -> Arc<ClientConfig> {
        self.driver.clone()
    }
}

/// Trust anchor selection for client connections. Native roots are used by
/// default; an extra CA file extends them.
#[derive(Default)]
pub struct TlsClientConfigBuilder {
    ca_file: Option<PathBuf>,
    no_native_roots: bool,
}

impl TlsClientConfigBuilder {
    pub fn ca_file(mut self, path: PathBuf) -> Self {
        self.ca_file = Some(path);
        self
    }

    pub fn no_native_roots(mut self) -> Self {
        self.no_native_roots = true;
        self
    }

    pub fn build(self) -> Result<TlsClientConfig, TlsConfigError> {
        let mut roots = RootCertStore::empty();

        if let Some(path) = &self.ca_file {
            let file = File::open(path).map_err(TlsConfigError::ReadCertFailed)?;
            let mut reader = BufReader::new(file);
            for cert in rustls_pemfile::certs(&mut reader) {
                let cert = cert.map_err(TlsConfigError::InvalidCert)?;
                roots.add(cert)?;
            }
        }

        if !self.no_native_roots {
            let certs = rustls_native_certs::load_native_certs()
                .map_err(TlsConfigError::LoadNativeCertsFailed)?;
            for cert in certs {
                // tolerate stray invalid anchors in the system store
                let _ = roots.add(cert);
            }
        }

        let config = ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth();
        Ok(TlsClientConfig {
            driver: Arc::new(config),
        })
    }
}
