/*
 * SPDX-License-Identifier: Apache-2.0
 */

//! Pluggable TCP and TLS transport for the hio engine: a unified stream
//! type for both transports, listeners that complete the TLS handshake at
//! accept time, and TLS config builders over rustls.

mod error;
pub use error::{ConnectError, ListenError, TlsConfigError};

mod stream;
pub use stream::{TlsCertInfo, TransportStream};

mod listen;
pub use listen::TransportListener;

mod tls;
pub use tls::{TlsClientConfig, TlsServerConfig};
