/*
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;

/// The HTTP/1.x protocol versions this engine speaks, rendered with one
/// decimal on the wire (`HTTP/1.0`, `HTTP/1.1`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HttpVersion {
    Http10,
    #[default]
    Http11,
}

impl HttpVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVersion::Http10 => "1.0",
            HttpVersion::Http11 => "1.1",
        }
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
