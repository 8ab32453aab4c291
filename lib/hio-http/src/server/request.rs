/*
 * SPDX-License-Identifier: Apache-2.0
 */

use std::str::FromStr;

use tokio::io::AsyncBufRead;

use super::HttpRequestParseError;
use crate::io::limited_read_until;
use crate::{BodyFraming, HttpHeaderLine, HttpRequestLine, HttpVersion, Method};

/// The parsed head of an HTTP/1.x request as received by a server
/// connection handler. Headers are kept in arrival order.
pub struct HttpRequestHead {
    pub method: Method,
    pub target: String,
    pub version: HttpVersion,
    pub headers: Vec<(String, String)>,
    content_length: u64,
    has_content_length: bool,
    chunked_transfer: bool,
}

impl HttpRequestHead {
    fn new(method: Method, target: String, version: HttpVersion) -> Self {
        HttpRequestHead {
            method,
            target,
            version,
            headers: Vec::new(),
            content_length: 0,
            has_content_length: false,
            chunked_transfer: false,
        }
    }

    pub async fn parse<R>(
        reader: &mut R,
        max_header_size: usize,
    ) -> Result<Self, HttpRequestParseError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut line_buf = Vec::<u8>::with_capacity(256);

        let (found, nr) = limited_read_until(reader, b'\n', max_header_size, &mut line_buf).await?;
        if nr == 0 {
            return Err(HttpRequestParseError::ClientClosed);
        }
        if !found {
            return if nr < max_header_size {
                Err(HttpRequestParseError::ClientClosed)
            } else {
                Err(HttpRequestParseError::TooLargeHeader(max_header_size))
            };
        }
        let mut header_size = nr;

        let line = HttpRequestLine::parse(line_buf.as_ref())
            .map_err(HttpRequestParseError::InvalidRequestLine)?;
        let mut head = HttpRequestHead::new(line.method, line.target.to_string(), line.version);

        loop {
            if header_size >= max_header_size {
                return Err(HttpRequestParseError::TooLargeHeader(max_header_size));
            }
            line_buf.clear();
            let max_len = max_header_size - header_size;
            let (found, nr) = limited_read_until(reader, b'\n', max_len, &mut line_buf).await?;
            if nr == 0 {
                return Err(HttpRequestParseError::ClientClosed);
            }
            if !found {
                return if nr < max_len {
                    Err(HttpRequestParseError::ClientClosed)
                } else {
                    Err(HttpRequestParseError::TooLargeHeader(max_header_size))
                };
            }
            header_size += nr;

            if (line_buf.len() == 1 && line_buf[0] == b'\n')
                || (line_buf.len() == 2 && line_buf[0] == b'\r' && line_buf[1] == b'\n')
            {
                break;
            }

            head.parse_header_line(line_buf.as_ref())?;
        }

        Ok(head)
    }

    fn parse_header_line(&mut self, line_buf: &[u8]) -> Result<(), HttpRequestParseError> {
        let header =
            HttpHeaderLine::parse(line_buf).map_err(HttpRequestParseError::InvalidHeaderLine)?;

        if header.name.eq_ignore_ascii_case("content-length") {
            let content_length = u64::from_str(header.value)
                .map_err(|_| HttpRequestParseError::InvalidContentLength)?;
            if self.has_content_length && self.content_length != content_length {
                return Err(HttpRequestParseError::InvalidContentLength);
            }
            self.has_content_length = true;
            self.content_length = content_length;
        } else if header.name.eq_ignore_ascii_case("transfer-encoding") {
            let v = header.value.to_lowercase();
            if v.ends_with("chunked") {
                self.chunked_transfer = true;
            } else if v.contains("chunked") {
                return Err(HttpRequestParseError::UnsupportedTransferEncoding);
            }
        }

        self.headers
            .push((header.name.to_string(), header.value.to_string()));
        Ok(())
    }

    /// Case-insensitive lookup of the first header with the given name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_framing(&self) -> BodyFraming {
        if self.chunked_transfer {
            BodyFraming::Chunked
        } else if self.has_content_length {
            BodyFraming::ContentLength(self.content_length)
        } else {
            BodyFraming::Unknown
        }
    }
}
