/*
 * SPDX-License-Identifier: Apache-2.0
 */

use std::io;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

use super::{ListenError, TlsServerConfig, TransportStream};

/// A listening socket yielding connected transport streams. With a TLS
/// config the server-side handshake is completed inside `accept`.
pub struct TransportListener {
    inner: TcpListener,
    tls: Option<TlsAcceptor>,
}

impl TransportListener {
    pub async fn bind(
        addr: SocketAddr,
        tls: Option<TlsServerConfig>,
    ) -> Result<Self, ListenError> {
        let inner = TcpListener::bind(addr).await?;
        Ok(TransportListener {
            inner,
            tls: tls.map(|c| TlsAcceptor::from(c.driver())),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    /// Accept one connection. A failed TLS handshake fails this accept
    /// only; the listener stays usable.
    pub async fn accept(&self) -> io::Result<(TransportStream, SocketAddr)> {
        let (tcp, peer_addr) = self.inner.accept().await?;
        let stream = match &self.tls {
            Some(acceptor) => {
                let tls = acceptor.accept(tcp).await?;
                TransportStream::from_tls(tls.into())
            }
            None => TransportStream::Plain(tcp),
        };
        Ok((stream, peer_addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn bind_and_accept_plain() {
        let listener = TransportListener::bind("127.0.0.1:0".parse().unwrap(), None)
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();

        let client = tokio::spawn(async move {
            let mut stream = TransportStream::connect("127.0.0.1", addr.port())
                .await
                .unwrap();
            stream.write_all(b"hi").await.unwrap();
        });

        let (mut stream, peer) = listener.accept().await.unwrap();
        assert!(peer.ip().is_loopback());
        let mut buf = [0u8; 2];
        stream.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hi");
        client.await.unwrap();
    }

    #[tokio::test]
    async fn bind_conflict() {
        let first = TransportListener::bind("127.0.0.1:0".parse().unwrap(), None)
            .await
            .unwrap();
        let addr = first.local_addr().unwrap();
        let r = TransportListener::bind(addr, None).await;
        assert!(matches!(r, Err(ListenError::BindFailed(_))));
    }
}
