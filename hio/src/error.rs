/*
 * SPDX-License-Identifier: Apache-2.0
 */

use std::io;

use thiserror::Error;

use hio_http::HttpBodyReadError;
use hio_http::client::{HttpRequestBuildError, HttpResponseParseError};
use hio_socket::ConnectError;

/// Failure of one request/response exchange, reported at the phase that
/// detected it. Nothing retries automatically.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] HttpRequestBuildError),
    #[error("connect failed: {0}")]
    ConnectFailed(#[from] ConnectError),
    #[error("send failed: {0:?}")]
    SendFailed(io::Error),
    #[error("recv response header failed: {0}")]
    RecvHeadFailed(#[from] HttpResponseParseError),
    #[error("timeout while waiting for response header")]
    HeadTimeout,
    #[error("recv response body failed: {0}")]
    RecvBodyFailed(#[from] HttpBodyReadError),
    #[error("response carries neither content-length nor chunked encoding")]
    NoBodyFraming,
    #[error("no request was sent")]
    NoRequestSent,
    #[error("exchange task aborted")]
    TaskAborted,
}
