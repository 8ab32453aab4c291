/*
 * SPDX-License-Identifier: Apache-2.0
 */

use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use openssl::x509::{X509, X509NameRef};
use rustls_pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite, Interest, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::{TlsConnector, TlsStream};

use super::{ConnectError, TlsClientConfig};

/// Negotiated cipher and peer certificate summary of a TLS stream.
#[derive(Debug, Clone)]
pub struct TlsCertInfo {
    pub cipher: String,
    pub subject: String,
    pub issuer: String,
}

/// A connected transport stream, plain TCP or TLS over TCP.
///
/// Both sides of the engine hold this type so protocol code never branches
/// on the transport.
pub enum TransportStream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl TransportStream {
    /// Resolve `host` and open a plain TCP connection.
    pub async fn connect(host: &str, port: u16) -> Result<Self, ConnectError> {
        let tcp = TcpStream::connect((host, port)).await?;
        Ok(TransportStream::Plain(tcp))
    }

    /// Open a TCP connection and run the TLS client handshake, with `host`
    /// as the SNI server name.
    pub async fn connect_tls(
        host: &str,
        port: u16,
        tls: &TlsClientConfig,
    ) -> Result<Self, ConnectError> {
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|_| ConnectError::InvalidServerName(host.to_string()))?;
        let tcp = TcpStream::connect((host, port)).await?;
        let connector = TlsConnector::from(tls.driver());
        let stream = connector
            .connect(server_name, tcp)
            .await
            .map_err(ConnectError::HandshakeFailed)?;
        Ok(TransportStream::Tls(Box::new(stream.into())))
    }

    pub(crate) fn from_tls(stream: TlsStream<TcpStream>) -> Self {
        TransportStream::Tls(Box::new(stream))
    }

    fn tcp_stream(&self) -> &TcpStream {
        match self {
            TransportStream::Plain(tcp) => tcp,
            TransportStream::Tls(tls) => tls.get_ref().0,
        }
    }

    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.tcp_stream().peer_addr()
    }

    /// Wait up to `timeout` for the socket to become readable.
    ///
    /// Returns false on expiry. Data already decrypted or buffered above
    /// the socket is not visible here; callers with their own read buffer
    /// must check it first.
    pub async fn readable(&self, timeout: Duration) -> io::Result<bool> {
        match tokio::time::timeout(timeout, self.tcp_stream().ready(Interest::READABLE)).await {
            Ok(Ok(ready)) => Ok(ready.is_readable()),
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(false),
        }
    }

    /// Cipher and peer certificate info for TLS streams, None on plain TCP
    /// or when the peer sent no certificate.
    pub fn cert_info(&self) -> Option<TlsCertInfo> {
        let TransportStream::Tls(tls) = self else {
            return None;
        };
        let (_, session) = tls.get_ref();
        let cipher = session
            .negotiated_cipher_suite()
            .map(|s| format!("{:?}", s.suite()))?;
        let cert = session.peer_certificates()?.first()?;
        let x509 = X509::from_der(cert.as_ref()).ok()?;
        Some(TlsCertInfo {
            cipher,
            subject: format_x509_name(x509.subject_name()),
            issuer: format_x509_name(x509.issuer_name()),
        })
    }
}

fn format_x509_name(name: &X509NameRef) -> String {
    let mut parts = Vec::new();
    for entry in name.entries() {
        let key = entry.object().nid().short_name().unwrap_or("?");
        if let Ok(value) = entry.data().as_utf8() {
            parts.push(format!("{key}={value}"));
        }
    }
    parts.join(", ")
}

impl AsyncRead for TransportStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            TransportStream::Plain(tcp) => Pin::new(tcp).poll_read(cx, buf),
            TransportStream::Tls(tls) => Pin::new(tls.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for TransportStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            TransportStream::Plain(tcp) => Pin::new(tcp).poll_write(cx, buf),
            TransportStream::Tls(tls) => Pin::new(tls.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            TransportStream::Plain(tcp) => Pin::new(tcp).poll_flush(cx),
            TransportStream::Tls(tls) => Pin::new(tls.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            TransportStream::Plain(tcp) => Pin::new(tcp).poll_shutdown(cx),
            TransportStream::Tls(tls) => Pin::new(tls.as_mut()).poll_shutdown(cx),
        }
    }
}
