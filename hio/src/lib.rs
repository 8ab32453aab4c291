/*
 * SPDX-License-Identifier: Apache-2.0
 */

//! An HTTP/1.x exchange engine over pluggable TCP/TLS transports: single
//! persistent connections, multiplexed batch connections with a shared
//! deadline, bounded-window task fan-out, and a polling accept/dispatch
//! server runtime.

mod config;
pub use config::{HttpClientConfig, HttpServerConfig};

mod error;
pub use error::ExchangeError;

mod handle;
pub use handle::{BodyCallback, ExchangeHandle};

pub mod client;
pub use client::{HttpConnection, HttpMultiConnection, HttpTaskFanout, SlotFlags, WindowPolicy};

pub mod server;
pub use server::{ConnectionHandler, HttpServer, ServerConnection, ServerQuitHandle};
