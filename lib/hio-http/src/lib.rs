/*
 * SPDX-License-Identifier: Apache-2.0
 */

//! HTTP/1.x wire protocol support for the hio engine: request formatting,
//! response and request head parsing, and body framing (content-length,
//! chunked transfer, raw streaming) over buffered async readers.

mod method;
pub use method::{InvalidMethod, Method};

mod version;
pub use version::HttpVersion;

mod parse;
pub use parse::{
    HttpChunkSizeLine, HttpHeaderLine, HttpLineParseError, HttpRequestLine, HttpStatusLine,
};

pub(crate) mod io;

mod body;
pub use body::{BodyFraming, HttpBodyReadError, HttpBodyReader};

pub mod client;
pub mod server;
