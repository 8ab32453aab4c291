/*
 * SPDX-License-Identifier: Apache-2.0
 */

use std::io;

use thiserror::Error;

use crate::HttpLineParseError;

/// How the end of a response body is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFraming {
    ContentLength(u64),
    Chunked,
    /// Neither a usable `Content-Length` nor `Transfer-Encoding: chunked`
    /// was present; there is no way to know where the body ends and the
    /// exchange must fail.
    Unknown,
}

#[derive(Debug, Error)]
pub enum HttpBodyReadError {
    #[error("reader closed")]
    ReaderClosed,
    #[error("idle timeout")]
    IdleTimeout,
    #[error("line too long (> {0})")]
    LineTooLong(usize),
    #[error("invalid chunk size line: {0}")]
    InvalidChunkLine(HttpLineParseError),
    #[error("missing CRLF after chunk data")]
    InvalidChunkEnd,
    #[error("read failed: {0:?}")]
    ReadFailed(#[from] io::Error),
}

mod reader;
pub use reader::HttpBodyReader;
