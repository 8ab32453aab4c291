/*
 * SPDX-License-Identifier: Apache-2.0
 */

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TlsConfigError {
    #[error("failed to read cert file: {0:?}")]
    ReadCertFailed(io::Error),
    #[error("invalid cert file: {0:?}")]
    InvalidCert(io::Error),
    #[error("failed to read key file: {0:?}")]
    ReadKeyFailed(io::Error),
    #[error("no private key found in key file")]
    NoPrivateKey,
    #[error("failed to load native ca certs: {0:?}")]
    LoadNativeCertsFailed(io::Error),
    #[error("tls config error: {0}")]
    Rustls(#[from] rustls::Error),
}

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("invalid server name: {0}")]
    InvalidServerName(String),
    #[error("connect failed: {0:?}")]
    ConnectFailed(#[from] io::Error),
    #[error("tls handshake failed: {0:?}")]
    HandshakeFailed(io::Error),
}

#[derive(Debug, Error)]
pub enum ListenError {
    #[error("bind failed: {0:?}")]
    BindFailed(#[from] io::Error),
}
