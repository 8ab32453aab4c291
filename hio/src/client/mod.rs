/*
 * SPDX-License-Identifier: Apache-2.0
 */

use std::time::Duration;

use tokio::io::AsyncBufRead;

use hio_http::client::HttpRequestBuilder;
use hio_http::{BodyFraming, HttpBodyReader};
use hio_socket::{ConnectError, TransportStream};

use super::{ExchangeError, ExchangeHandle, HttpClientConfig};

mod connection;
pub use connection::HttpConnection;

mod multi;
pub use multi::{HttpMultiConnection, SlotFlags};

mod fanout;
pub use fanout::{HttpTaskFanout, WindowPolicy};

pub(crate) async fn connect_transport(
    config: &HttpClientConfig,
) -> Result<TransportStream, ConnectError> {
    match config.tls() {
        Some(tls) => TransportStream::connect_tls(config.host(), config.port(), tls).await,
        None => TransportStream::connect(config.host(), config.port()).await,
    }
}

pub(crate) fn build_request(
    config: &HttpClientConfig,
    handle: &ExchangeHandle,
) -> Result<Vec<u8>, ExchangeError> {
    let buf = HttpRequestBuilder::new(handle.method(), handle.endpoint(), config.host())
        .version(config.version())
        .user_agent(config.user_agent())
        .headers(handle.headers())
        .body(handle.body())
        .build()?;
    Ok(buf)
}

/// Complete the body phase of one exchange according to the detected
/// framing, delivering bytes through the handle's callback or into its
/// aggregation buffer. Bytes delivered before a failure stay delivered.
pub(crate) async fn recv_response_body<R>(
    reader: &mut R,
    framing: BodyFraming,
    idle_timeout: Duration,
    handle: &mut ExchangeHandle,
) -> Result<(), ExchangeError>
where
    R: AsyncBufRead + Unpin,
{
    let mut body_reader = HttpBodyReader::new(reader, idle_timeout);
    match framing {
        BodyFraming::ContentLength(0) => Ok(()),
        BodyFraming::ContentLength(n) => {
            let mut buf = Vec::with_capacity(usize::try_from(n).unwrap_or(0).min(65536));
            body_reader.read_fixed(n, &mut buf).await?;
            let mut cb = handle.take_callback();
            match cb.as_mut() {
                Some(f) => f(&buf),
                None => handle.append_response_body(&buf),
            }
            handle.put_callback(cb);
            handle.add_response_body_size(n);
            Ok(())
        }
        BodyFraming::Chunked => {
            let mut cb = handle.take_callback();
            let (r, aggregated) = match cb.as_mut() {
                Some(f) => (body_reader.read_chunked(&mut |d: &[u8]| f(d)).await, None),
                None => {
                    let mut buf = Vec::new();
                    let r = body_reader
                        .read_chunked(&mut |d: &[u8]| buf.extend_from_slice(d))
                        .await;
                    (r, Some(buf))
                }
            };
            handle.put_callback(cb);
            if let Some(buf) = aggregated {
                handle.append_response_body(&buf);
            }
            let total = r?;
            handle.add_response_body_size(total);
            Ok(())
        }
        BodyFraming::Unknown => Err(ExchangeError::NoBodyFraming),
    }
}

/// Raw streaming delivery: every byte run goes through the handle until
/// EOF or the idle window closes, both of which end the stream cleanly.
pub(crate) async fn recv_response_stream<R>(
    reader: &mut R,
    idle_timeout: Duration,
    handle: &mut ExchangeHandle,
) -> Result<(), ExchangeError>
where
    R: AsyncBufRead + Unpin,
{
    let mut body_reader = HttpBodyReader::new(reader, idle_timeout);
    let mut cb = handle.take_callback();
    let (r, aggregated) = match cb.as_mut() {
        Some(f) => (body_reader.read_stream(&mut |d: &[u8]| f(d)).await, None),
        None => {
            let mut buf = Vec::new();
            let r = body_reader
                .read_stream(&mut |d: &[u8]| buf.extend_from_slice(d))
                .await;
            (r, Some(buf))
        }
    };
    handle.put_callback(cb);
    if let Some(buf) = aggregated {
        handle.append_response_body(&buf);
    }
    let total = r?;
    handle.add_response_body_size(total);
    Ok(())
}
