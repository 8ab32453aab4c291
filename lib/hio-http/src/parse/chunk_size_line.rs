/*
 * SPDX-License-Identifier: Apache-2.0
 */

use atoi::FromRadix16;

use super::HttpLineParseError;

/// A chunk-size line of a chunked transfer encoded body.
///
/// Chunk extensions are accepted and ignored; a line whose size field is
/// not valid hexadecimal is a hard parse failure.
pub struct HttpChunkSizeLine {
    pub size: u64,
}

impl HttpChunkSizeLine {
    pub fn parse(buf: &[u8]) -> Result<HttpChunkSizeLine, HttpLineParseError> {
        let (size, offset) = u64::from_radix_16(buf);
        if offset == 0 {
            return Err(HttpLineParseError::InvalidChunkSize);
        }

        if buf.len() == offset {
            return Err(HttpLineParseError::NotLongEnough);
        }

        match buf[offset] {
            b'\r' | b'\n' | b';' => Ok(HttpChunkSizeLine { size }),
            _ => Err(HttpLineParseError::InvalidChunkSize),
        }
    }
}
