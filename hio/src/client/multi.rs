/*
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::io::{AsyncWriteExt, BufReader};

use hio_http::BodyFraming;
use hio_http::client::HttpResponseHead;
use hio_socket::{ConnectError, TransportStream};

use super::{
    ExchangeError, ExchangeHandle, HttpClientConfig, build_request, connect_transport,
    recv_response_body,
};

/// Progress markers of one batch slot, inspectable after `perform` to see
/// how far a slot got before the shared deadline.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotFlags {
    pub connected: bool,
    pub sent: bool,
    pub header_received: bool,
    pub is_chunked: bool,
    pub content_length: Option<u64>,
}

struct Slot {
    config: Arc<HttpClientConfig>,
    stream: BufReader<TransportStream>,
}

/// A batch of pre-connected slots driven together under one shared
/// deadline. Slots that failed to connect stay empty for the whole batch;
/// slots whose receive phase the deadline cuts short keep their partial
/// state without teardown.
pub struct HttpMultiConnection {
    slots: Vec<Option<Slot>>,
    flags: Vec<SlotFlags>,
}

impl HttpMultiConnection {
    /// Connect `n` slots against one shared config.
    pub async fn connect(config: Arc<HttpClientConfig>, n: usize) -> Result<Self, ConnectError> {
        Self::connect_each(vec![config; n]).await
    }

    /// Connect one slot per config. Connect failures are logged and leave
    /// the slot empty; construction fails only when no slot connected.
    pub async fn connect_each(
        configs: Vec<Arc<HttpClientConfig>>,
    ) -> Result<Self, ConnectError> {
        let mut slots = Vec::with_capacity(configs.len());
        let mut flags = vec![SlotFlags::default(); configs.len()];
        let mut last_error: Option<ConnectError> = None;

        for (i, config) in configs.into_iter().enumerate() {
            match connect_transport(&config).await {
                Ok(stream) => {
                    flags[i].connected = true;
                    slots.push(Some(Slot {
                        config,
                        stream: BufReader::new(stream),
                    }));
                }
                Err(e) => {
                    log::warn!(
                        "slot {i}: connect to {}:{} failed: {e}",
                        config.host(),
                        config.port()
                    );
                    last_error = Some(e);
                    slots.push(None);
                }
            }
        }

        if flags.iter().any(|f| f.connected) {
            Ok(HttpMultiConnection { slots, flags })
        } else {
            match last_error {
                Some(e) => Err(e),
                None => Err(ConnectError::ConnectFailed(std::io::Error::new(
                    std::io::ErrorKind::NotConnected,
                    "no slot to connect",
                ))),
            }
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn connected_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn slot_flags(&self) -> &[SlotFlags] {
        &self.flags
    }

    /// Drive one exchange per connected slot: a sequential send phase,
    /// then all receive phases interleaved under the shared `deadline`.
    ///
    /// Handles pair with slots by index. The call fails only when no
    /// request at all went out; per-slot receive failures and deadline
    /// expiry leave the affected slots in their partial state and the call
    /// still succeeds. Inspect `slot_flags` to tell them apart.
    pub async fn perform(
        &mut self,
        handles: &mut [ExchangeHandle],
        deadline: Duration,
    ) -> Result<(), ExchangeError> {
        let mut any_sent = false;
        for (i, (slot, flags)) in self.slots.iter_mut().zip(self.flags.iter_mut()).enumerate() {
            flags.sent = false;
            flags.header_received = false;
            let Some(slot) = slot.as_mut() else { continue };
            let Some(handle) = handles.get(i) else {
                continue;
            };
            match send_one(slot, handle).await {
                Ok(()) => {
                    flags.sent = true;
                    any_sent = true;
                }
                Err(e) => log::warn!("slot {i}: send failed: {e}"),
            }
        }
        if !any_sent {
            return Err(ExchangeError::NoRequestSent);
        }

        let mut futs = Vec::new();
        for (i, ((slot, flags), handle)) in self
            .slots
            .iter_mut()
            .zip(self.flags.iter_mut())
            .zip(handles.iter_mut())
            .enumerate()
        {
            let Some(slot) = slot.as_mut() else { continue };
            if flags.sent {
                futs.push(recv_one(i, slot, flags, handle));
            }
        }
        // deadline expiry drops unfinished receive futures in place
        let _ = tokio::time::timeout(deadline, join_all(futs)).await;
        Ok(())
    }
}

async fn send_one(slot: &mut Slot, handle: &ExchangeHandle) -> Result<(), ExchangeError> {
    let buf = build_request(&slot.config, handle)?;
    let stream = slot.stream.get_mut();
    stream
        .write_all(&buf)
        .await
        .map_err(ExchangeError::SendFailed)?;
    stream.flush().await.map_err(ExchangeError::SendFailed)
}

async fn recv_one(i: usize, slot: &mut Slot, flags: &mut SlotFlags, handle: &mut ExchangeHandle) {
    let head =
        match HttpResponseHead::parse(&mut slot.stream, slot.config.max_header_size()).await {
            Ok(head) => head,
            Err(e) => {
                log::warn!("slot {i}: recv response header failed: {e}");
                return;
            }
        };
    flags.header_received = true;
    flags.sent = false;
    let framing = head.framing();
    match framing {
        BodyFraming::ContentLength(n) => flags.content_length = Some(n),
        BodyFraming::Chunked => flags.is_chunked = true,
        BodyFraming::Unknown => {}
    }
    handle.set_response_head(head);

    match recv_response_body(&mut slot.stream, framing, slot.config.timeout(), handle).await {
        Ok(()) => flags.header_received = false,
        Err(e) => log::warn!("slot {i}: recv response body failed: {e}"),
    }
}
