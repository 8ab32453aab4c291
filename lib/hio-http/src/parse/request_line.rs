/*
 * SPDX-License-Identifier: Apache-2.0
 */

use std::str::FromStr;

use super::HttpLineParseError;
use crate::{HttpVersion, Method};

pub struct HttpRequestLine<'a> {
    pub method: Method,
    pub target: &'a str,
    pub version: HttpVersion,
}

impl<'a> HttpRequestLine<'a> {
    pub fn parse(buf: &'a [u8]) -> Result<HttpRequestLine<'a>, HttpLineParseError> {
        const MINIMAL_LENGTH: usize = 14; // GET / HTTP/1.x

        if buf.len() < MINIMAL_LENGTH {
            return Err(HttpLineParseError::NotLongEnough);
        }

        let Some(p) = memchr::memchr(b' ', buf) else {
            return Err(HttpLineParseError::NoDelimiterFound(' '));
        };
        let method = std::str::from_utf8(&buf[0..p])
            .map_err(HttpLineParseError::InvalidUtf8Encoding)
            .and_then(|s| Method::from_str(s).map_err(|_| HttpLineParseError::InvalidMethod))?;

        let left = &buf[p + 1..];
        let Some(p) = memchr::memchr(b' ', left) else {
            return Err(HttpLineParseError::NoDelimiterFound(' '));
        };
        let target = std::str::from_utf8(&left[0..p])?;
        if target.is_empty() {
            return Err(HttpLineParseError::NotLongEnough);
        }

        let left = std::str::from_utf8(&left[p + 1..])?.trim_end();
        let version = match left {
            "HTTP/1.0" => HttpVersion::Http10,
            "HTTP/1.1" => HttpVersion::Http11,
            _ => return Err(HttpLineParseError::InvalidVersion),
        };

        Ok(HttpRequestLine {
            method,
            target,
            version,
        })
    }
}
