/*
 * SPDX-License-Identifier: Apache-2.0
 */

mod error;
pub use error::HttpRequestParseError;

mod request;
pub use request::HttpRequestHead;
