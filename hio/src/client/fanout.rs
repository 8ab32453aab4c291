/*
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use tokio::task::JoinSet;

use super::{ExchangeError, ExchangeHandle, HttpClientConfig, HttpConnection};

/// How a fan-out window slides to the next batch of handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPolicy {
    /// The whole window finishes before the next one starts.
    WaitAll,
    /// A new task starts as soon as any in-flight one finishes, keeping up
    /// to `window_size` tasks running.
    WaitAny,
}

/// Fan one exchange per handle out over independent connections, bounded
/// by a sliding task window. Each task owns its handle and its connection;
/// no state is shared across tasks.
pub struct HttpTaskFanout {
    config: Arc<HttpClientConfig>,
    handles: Vec<Option<ExchangeHandle>>,
}

impl HttpTaskFanout {
    pub fn new(config: Arc<HttpClientConfig>, handles: Vec<ExchangeHandle>) -> Self {
        HttpTaskFanout {
            config,
            handles: handles.into_iter().map(Some).collect(),
        }
    }

    /// Run every exchange to completion and return per-handle results in
    /// handle order. Completed handles are stored back for inspection via
    /// `handle` / `into_handles`.
    pub async fn perform(
        &mut self,
        window_size: usize,
        policy: WindowPolicy,
    ) -> Vec<Result<(), ExchangeError>> {
        let n = self.handles.len();
        let window_size = window_size.max(1);
        let mut results: Vec<Result<(), ExchangeError>> =
            (0..n).map(|_| Err(ExchangeError::TaskAborted)).collect();
        let mut join_set: JoinSet<(usize, ExchangeHandle, Result<(), ExchangeError>)> =
            JoinSet::new();
        let mut next = 0usize;

        loop {
            match policy {
                WindowPolicy::WaitAll => {
                    if join_set.is_empty() {
                        let end = (next + window_size).min(n);
                        while next < end {
                            self.spawn_exchange(&mut join_set, next);
                            next += 1;
                        }
                    }
                }
                WindowPolicy::WaitAny => {
                    while join_set.len() < window_size && next < n {
                        self.spawn_exchange(&mut join_set, next);
                        next += 1;
                    }
                }
            }

            match join_set.join_next().await {
                Some(Ok((idx, handle, r))) => {
                    self.handles[idx] = Some(handle);
                    results[idx] = r;
                }
                Some(Err(e)) => {
                    log::warn!("exchange task failed to join: {e}");
                }
                None => {
                    if next >= n {
                        break;
                    }
                }
            }
        }

        results
    }

    fn spawn_exchange(
        &mut self,
        join_set: &mut JoinSet<(usize, ExchangeHandle, Result<(), ExchangeError>)>,
        idx: usize,
    ) {
        let Some(mut handle) = self.handles[idx].take() else {
            return;
        };
        let config = self.config.clone();
        join_set.spawn(async move {
            let r = run_exchange(config, &mut handle).await;
            (idx, handle, r)
        });
    }

    /// The handle at `idx`, once its task completed.
    pub fn handle(&self, idx: usize) -> Option<&ExchangeHandle> {
        self.handles.get(idx).and_then(|h| h.as_ref())
    }

    pub fn into_handles(self) -> Vec<Option<ExchangeHandle>> {
        self.handles
    }
}

async fn run_exchange(
    config: Arc<HttpClientConfig>,
    handle: &mut ExchangeHandle,
) -> Result<(), ExchangeError> {
    let mut conn = HttpConnection::connect(config).await?;
    conn.perform(handle).await
}
