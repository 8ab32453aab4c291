/*
 * SPDX-License-Identifier: Apache-2.0
 */

mod client;
pub use client::{TlsClientConfig, TlsClientConfigBuilder};

mod server;
pub use server::{TlsServerConfig, TlsServerConfigBuilder};
