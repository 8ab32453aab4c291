/*
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

use rustls::ServerConfig;
use rustls_pki_types::CertificateDer;

use super::super::TlsConfigError;

/// Built TLS server parameters: one certificate chain and its key, loaded
/// from PEM files at construction.
#[derive(Clone)]
pub struct TlsServerConfig {
    driver: Arc<ServerConfig>,
}

impl TlsServerConfig {
    pub fn builder(cert_file: PathBuf, key_file: PathBuf) -> TlsServerConfigBuilder {
        TlsServerConfigBuilder {
            cert_file,
            key_file,
        }
    }

    pub(crate) fn driver(&self) -> Arc<ServerConfig> {
        self.driver.clone()
    }
}

pub struct TlsServerConfigBuilder {
    cert_file: PathBuf,
    key_file: PathBuf,
}

impl TlsServerConfigBuilder {
    pub fn build(self) -> Result<TlsServerConfig, TlsConfigError> {
        let file = File::open(&self.cert_file).map_err(TlsConfigError::ReadCertFailed)?;
        let mut reader = BufReader::new(file);
        let certs = rustls_pemfile::certs(&mut reader)
            .collect::<Result<Vec<CertificateDer<'static>>, _>>()
            .map_err(TlsConfigError::InvalidCert)?;

        let file = File::open(&self.key_file).map_err(TlsConfigError::ReadKeyFailed)?;
        let mut reader = BufReader::new(file);
        let key = rustls_pemfile::private_key(&mut reader)
            .map_err(TlsConfigError::ReadKeyFailed)?
            .ok_or(TlsConfigError::NoPrivateKey)?;

        let config = ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(certs, key)?;
        Ok(TlsServerConfig {
            driver: Arc::new(config),
        })
    }
}
