/*
 * SPDX-License-Identifier: Apache-2.0
 */

use std::io::Write;

use super::HttpRequestBuildError;
use crate::{HttpVersion, Method};

/// Formats one HTTP/1.x request into wire bytes.
///
/// The layout is byte-exact: request line, then the mandatory `Host`,
/// `User-Agent` and `Accept` headers, then every caller header in
/// insertion order (no reordering, no deduplication), then — only when a
/// body is present — `Content-Length`, the blank line and the body, and a
/// trailing CRLF.
pub struct HttpRequestBuilder<'a> {
    method: Method,
    endpoint: &'a str,
    version: HttpVersion,
    host: &'a str,
    user_agent: &'a str,
    headers: &'a [String],
    body: &'a [u8],
}

impl<'a> HttpRequestBuilder<'a> {
    pub fn new(method: Method, endpoint: &'a str, host: &'a str) -> Self {
        HttpRequestBuilder {
            method,
            endpoint,
            version: HttpVersion::default(),
            host,
            user_agent: "hio",
            headers: &[],
            body: &[],
        }
    }

    pub fn version(mut self, version: HttpVersion) -> Self {
        self.version = version;
        self
    }

    pub fn user_agent(mut self, agent: &'a str) -> Self {
        self.user_agent = agent;
        self
    }

    /// Raw header lines (`Name: value`), kept in insertion order.
    pub fn headers(mut self, headers: &'a [String]) -> Self {
        self.headers = headers;
        self
    }

    pub fn body(mut self, body: &'a [u8]) -> Self {
        self.body = body;
        self
    }

    /// Validate and serialize. Fails before any serialization when the
    /// method does not permit the supplied body.
    pub fn build(&self) -> Result<Vec<u8>, HttpRequestBuildError> {
        if !self.body.is_empty() && !self.method.body_allowed() {
            return Err(HttpRequestBuildError::BodyNotAllowed(self.method));
        }

        let mut buf = Vec::<u8>::with_capacity(256 + self.body.len());
        let _ = write!(
            buf,
            "{} {} HTTP/{}\r\n",
            self.method, self.endpoint, self.version
        );
        let _ = write!(
            buf,
            "Host: {}\r\nUser-Agent: {}\r\nAccept: */*\r\n",
            self.host, self.user_agent
        );
        for h in self.headers {
            let _ = write!(buf, "{h}\r\n");
        }
        if !self.body.is_empty() {
            let _ = write!(buf, "Content-Length: {}\r\n\r\n", self.body.len());
            buf.extend_from_slice(self.body);
        }
        buf.extend_from_slice(b"\r\n");
        Ok(buf)
    }
}
