/*
 * SPDX-License-Identifier: Apache-2.0
 */

mod error;
pub use error::{HttpRequestBuildError, HttpResponseParseError};

mod request;
pub use request::HttpRequestBuilder;

mod response;
pub use response::HttpResponseHead;
