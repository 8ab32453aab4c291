/*
 * SPDX-License-Identifier: Apache-2.0
 */

mod error;
pub use error::HttpLineParseError;

mod status_line;
pub use status_line::HttpStatusLine;

mod header_line;
pub use header_line::HttpHeaderLine;

mod chunk_size_line;
pub use chunk_size_line::HttpChunkSizeLine;

mod request_line;
pub use request_line::HttpRequestLine;
