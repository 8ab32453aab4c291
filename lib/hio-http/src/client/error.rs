/*
 * SPDX-License-Identifier: Apache-2.0
 */

use std::io;

use thiserror::Error;

use crate::{HttpLineParseError, Method};

#[derive(Debug, Error)]
pub enum HttpRequestBuildError {
    #[error("request body not allowed for {0} requests")]
    BodyNotAllowed(Method),
}

#[derive(Debug, Error)]
pub enum HttpResponseParseError {
    #[error("remote closed")]
    RemoteClosed,
    #[error("too large header (> {0})")]
    TooLargeHeader(usize),
    #[error("invalid status line: {0}")]
    InvalidStatusLine(HttpLineParseError),
    #[error("invalid header line: {0}")]
    InvalidHeaderLine(HttpLineParseError),
    #[error("invalid content-length value")]
    InvalidContentLength,
    #[error("unsupported transfer-encoding")]
    UnsupportedTransferEncoding,
    #[error("read failed: {0:?}")]
    ReadFailed(#[from] io::Error),
}
