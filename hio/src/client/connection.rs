/*
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use tokio::io::{AsyncWriteExt, BufReader};

use hio_http::client::HttpResponseHead;
use hio_socket::{ConnectError, TlsCertInfo, TransportStream};

use super::{
    ExchangeError, ExchangeHandle, HttpClientConfig, build_request, connect_transport,
    recv_response_body, recv_response_stream,
};

/// One persistent client connection. The transport is established eagerly
/// at construction; each `perform` call drives one full exchange and
/// leaves the connection reusable for the next handle.
pub struct HttpConnection {
    config: Arc<HttpClientConfig>,
    stream: BufReader<TransportStream>,
}

impl HttpConnection {
    pub async fn connect(config: Arc<HttpClientConfig>) -> Result<Self, ConnectError> {
        let stream = connect_transport(&config).await?;
        log::debug!("connected to {}:{}", config.host(), config.port());
        Ok(HttpConnection {
            config,
            stream: BufReader::new(stream),
        })
    }

    /// Negotiated TLS parameters, None on plain TCP.
    pub fn cert_info(&self) -> Option<TlsCertInfo> {
        self.stream.get_ref().cert_info()
    }

    async fn send_request(&mut self, handle: &mut ExchangeHandle) -> Result<(), ExchangeError> {
        let buf = build_request(&self.config, handle)?;
        let stream = self.stream.get_mut();
        stream
            .write_all(&buf)
            .await
            .map_err(ExchangeError::SendFailed)?;
        stream.flush().await.map_err(ExchangeError::SendFailed)
    }

    async fn recv_head(&mut self) -> Result<HttpResponseHead, ExchangeError> {
        match tokio::time::timeout(
            self.config.timeout(),
            HttpResponseHead::parse(&mut self.stream, self.config.max_header_size()),
        )
        .await
        {
            Ok(Ok(head)) => Ok(head),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(ExchangeError::HeadTimeout),
        }
    }

    /// Drive one framed exchange: send, head parse bounded by the config
    /// timeout, then body completion per detected framing. Stops at the
    /// first failing phase.
    pub async fn perform(&mut self, handle: &mut ExchangeHandle) -> Result<(), ExchangeError> {
        self.send_request(handle).await?;
        let head = self.recv_head().await?;
        let framing = head.framing();
        handle.set_response_head(head);
        recv_response_body(&mut self.stream, framing, self.config.timeout(), handle).await
    }

    /// Drive one exchange whose response body is an unframed byte stream:
    /// same send and head phases, then raw delivery until EOF or the idle
    /// window closes.
    pub async fn perform_stream(
        &mut self,
        handle: &mut ExchangeHandle,
    ) -> Result<(), ExchangeError> {
        self.send_request(handle).await?;
        let head = self.recv_head().await?;
        handle.set_response_head(head);
        recv_response_stream(&mut self.stream, self.config.timeout(), handle).await
    }
}
