/*
 * SPDX-License-Identifier: Apache-2.0
 */

use hio_http::Method;
use hio_http::client::HttpResponseHead;

/// Body delivery callback: invoked once with the whole body for
/// content-length responses, once per chunk for chunked responses, once
/// per byte run in streaming mode.
pub type BodyCallback = Box<dyn FnMut(&[u8]) + Send>;

/// One request plus the storage its response is written into.
///
/// Created and populated by the caller, driven by the engine during the
/// exchange, read afterwards. A handle carries exactly one exchange; reuse
/// a connection with a fresh handle for the next one.
pub struct ExchangeHandle {
    method: Method,
    endpoint: String,
    headers: Vec<String>,
    body: Vec<u8>,
    callback: Option<BodyCallback>,

    rsp_head: Option<HttpResponseHead>,
    rsp_body: Vec<u8>,
    rsp_body_size: u64,
}

impl ExchangeHandle {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        ExchangeHandle {
            method,
            endpoint: endpoint.into(),
            headers: Vec::new(),
            body: Vec::new(),
            callback: None,
            rsp_head: None,
            rsp_body: Vec::new(),
            rsp_body_size: 0,
        }
    }

    /// Append a raw header line (`Name: value`); lines are sent in
    /// insertion order with no deduplication.
    pub fn add_header(&mut self, line: impl Into<String>) {
        self.headers.push(line.into());
    }

    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body = body;
    }

    /// Install a body delivery callback. Without one, delivered bytes are
    /// aggregated into the handle's response body buffer instead.
    pub fn set_callback<F>(&mut self, cb: F)
    where
        F: FnMut(&[u8]) + Send + 'static,
    {
        self.callback = Some(Box::new(cb));
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn response_head(&self) -> Option<&HttpResponseHead> {
        self.rsp_head.as_ref()
    }

    /// Aggregated response body bytes; empty when a callback consumed them.
    pub fn response_body(&self) -> &[u8] {
        &self.rsp_body
    }

    /// Total number of body bytes delivered, callback or not.
    pub fn response_body_size(&self) -> u64 {
        self.rsp_body_size
    }

    pub(crate) fn set_response_head(&mut self, head: HttpResponseHead) {
        self.rsp_head = Some(head);
    }

    pub(crate) fn take_callback(&mut self) -> Option<BodyCallback> {
        self.callback.take()
    }

    pub(crate) fn put_callback(&mut self, cb: Option<BodyCallback>) {
        self.callback = cb;
    }

    pub(crate) fn append_response_body(&mut self, data: &[u8]) {
        self.rsp_body.extend_from_slice(data);
    }

    pub(crate) fn add_response_body_size(&mut self, nr: u64) {
        self.rsp_body_size += nr;
    }
}
