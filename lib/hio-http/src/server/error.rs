/*
 * SPDX-License-Identifier: Apache-2.0
 */

use std::io;

use thiserror::Error;

use crate::HttpLineParseError;

#[derive(Debug, Error)]
pub enum HttpRequestParseError {
    #[error("client closed")]
    ClientClosed,
    #[error("too large header (> {0})")]
    TooLargeHeader(usize),
    #[error("invalid request line: {0}")]
    InvalidRequestLine(HttpLineParseError),
    #[error("invalid header line: {0}")]
    InvalidHeaderLine(HttpLineParseError),
    #[error("invalid content-length value")]
    InvalidContentLength,
    #[error("unsupported transfer-encoding")]
    UnsupportedTransferEncoding,
    #[error("read failed: {0:?}")]
    ReadFailed(#[from] io::Error),
}
