/*
 * SPDX-License-Identifier: Apache-2.0
 */

use std::str::FromStr;

use tokio::io::AsyncBufRead;

use super::HttpResponseParseError;
use crate::io::limited_read_until;
use crate::{BodyFraming, HttpHeaderLine, HttpStatusLine, HttpVersion};

/// The parsed head of an HTTP/1.x response: status line, the raw header
/// block (terminating blank line included) and the detected body framing.
pub struct HttpResponseHead {
    pub version: HttpVersion,
    pub code: u16,
    pub reason: String,
    raw: Vec<u8>,
    content_length: u64,
    has_content_length: bool,
    chunked_transfer: bool,
}

impl HttpResponseHead {
    fn new(version: HttpVersion, code: u16, reason: String) -> Self {
        HttpResponseHead {
            version,
            code,
            reason,
            raw: Vec::new(),
            content_length: 0,
            has_content_length: false,
            chunked_transfer: false,
        }
    }

    /// Read and parse the full response head from `reader`.
    ///
    /// Lines are accumulated until the blank-line terminator; the whole
    /// block is bounded by `max_header_size`. The caller bounds the whole
    /// phase with a timeout.
    pub async fn parse<R>(
        reader: &mut R,
        max_header_size: usize,
    ) -> Result<Self, HttpResponseParseError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut raw = Vec::<u8>::with_capacity(1024);
        let mut line_buf = Vec::<u8>::with_capacity(256);

        let (found, nr) = limited_read_until(reader, b'\n', max_header_size, &mut line_buf).await?;
        if nr == 0 {
            return Err(HttpResponseParseError::RemoteClosed);
        }
        if !found {
            return if nr < max_header_size {
                Err(HttpResponseParseError::RemoteClosed)
            } else {
                Err(HttpResponseParseError::TooLargeHeader(max_header_size))
            };
        }
        let mut header_size = nr;

        let status = HttpStatusLine::parse(line_buf.as_ref())
            .map_err(HttpResponseParseError::InvalidStatusLine)?;
        let mut head =
            HttpResponseHead::new(status.version, status.code, status.reason.to_string());
        raw.extend_from_slice(&line_buf);

        loop {
            if header_size >= max_header_size {
                return Err(HttpResponseParseError::TooLargeHeader(max_header_size));
            }
            line_buf.clear();
            let max_len = max_header_size - header_size;
            let (found, nr) = limited_read_until(reader, b'\n', max_len, &mut line_buf).await?;
            if nr == 0 {
                return Err(HttpResponseParseError::RemoteClosed);
            }
            if !found {
                return if nr < max_len {
                    Err(HttpResponseParseError::RemoteClosed)
                } else {
                    Err(HttpResponseParseError::TooLargeHeader(max_header_size))
                };
            }
            header_size += nr;
            raw.extend_from_slice(&line_buf);

            if (line_buf.len() == 1 && line_buf[0] == b'\n')
                || (line_buf.len() == 2 && line_buf[0] == b'\r' && line_buf[1] == b'\n')
            {
                // header end line
                break;
            }

            head.parse_header_line(line_buf.as_ref())?;
        }

        head.raw = raw;
        Ok(head)
    }

    fn parse_header_line(&mut self, line_buf: &[u8]) -> Result<(), HttpResponseParseError> {
        let header =
            HttpHeaderLine::parse(line_buf).map_err(HttpResponseParseError::InvalidHeaderLine)?;

        if header.name.eq_ignore_ascii_case("content-length") {
            let content_length = u64::from_str(header.value)
                .map_err(|_| HttpResponseParseError::InvalidContentLength)?;
            if self.has_content_length && self.content_length != content_length {
                return Err(HttpResponseParseError::InvalidContentLength);
            }
            self.has_content_length = true;
            self.content_length = content_length;
        } else if header.name.eq_ignore_ascii_case("transfer-encoding") {
            let v = header.value.to_lowercase();
            if v.ends_with("chunked") {
                self.chunked_transfer = true;
            } else if v.contains("chunked") {
                return Err(HttpResponseParseError::UnsupportedTransferEncoding);
            }
        }

        Ok(())
    }

    /// The detected body framing. Chunked transfer takes precedence over a
    /// content-length header; with neither present the framing is unknown
    /// and the exchange cannot determine where the body ends.
    pub fn framing(&self) -> BodyFraming {
        if self.chunked_transfer {
            BodyFraming::Chunked
        } else if self.has_content_length {
            BodyFraming::ContentLength(self.content_length)
        } else {
            BodyFraming::Unknown
        }
    }

    /// The raw header block as received, including the terminator.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }
}
