/*
 * SPDX-License-Identifier: Apache-2.0
 */

use std::net::SocketAddr;
use std::time::Duration;

use hio_http::HttpVersion;
use hio_socket::{TlsClientConfig, TlsServerConfig};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_HEADER_SIZE: usize = 8192;
const DEFAULT_USER_AGENT: &str = "hio";

/// Parameters shared by every exchange a client connection performs.
///
/// `timeout` bounds each receive phase: the response head as a whole, and
/// each read gap while the body arrives.
#[derive(Clone)]
pub struct HttpClientConfig {
    host: String,
    port: u16,
    version: HttpVersion,
    user_agent: String,
    timeout: Duration,
    max_header_size: usize,
    tls: Option<TlsClientConfig>,
}

impl HttpClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        HttpClientConfig {
            host: host.into(),
            port,
            version: HttpVersion::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_header_size: DEFAULT_MAX_HEADER_SIZE,
            tls: None,
        }
    }

    pub fn set_version(&mut self, version: HttpVersion) {
        self.version = version;
    }

    pub fn set_user_agent(&mut self, agent: impl Into<String>) {
        self.user_agent = agent.into();
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn set_max_header_size(&mut self, max: usize) {
        self.max_header_size = max;
    }

    pub fn set_tls_client(&mut self, tls: TlsClientConfig) {
        self.tls = Some(tls);
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn version(&self) -> HttpVersion {
        self.version
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_header_size(&self) -> usize {
        self.max_header_size
    }

    pub fn tls(&self) -> Option<&TlsClientConfig> {
        self.tls.as_ref()
    }
}

const DEFAULT_ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);
const DEFAULT_DISPATCH_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Parameters of the accept/dispatch server runtime.
#[derive(Clone)]
pub struct HttpServerConfig {
    listen_addr: SocketAddr,
    accept_poll_interval: Duration,
    dispatch_poll_interval: Duration,
    tls: Option<TlsServerConfig>,
}

impl HttpServerConfig {
    pub fn new(listen_addr: SocketAddr) -> Self {
        HttpServerConfig {
            listen_addr,
            accept_poll_interval: DEFAULT_ACCEPT_POLL_INTERVAL,
            dispatch_poll_interval: DEFAULT_DISPATCH_POLL_INTERVAL,
            tls: None,
        }
    }

    pub fn set_accept_poll_interval(&mut self, interval: Duration) {
        self.accept_poll_interval = interval;
    }

    pub fn set_dispatch_poll_interval(&mut self, interval: Duration) {
        self.dispatch_poll_interval = interval;
    }

    pub fn set_tls_server(&mut self, tls: TlsServerConfig) {
        self.tls = Some(tls);
    }

    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }

    pub fn accept_poll_interval(&self) -> Duration {
        self.accept_poll_interval
    }

    pub fn dispatch_poll_interval(&self) -> Duration {
        self.dispatch_poll_interval
    }

    pub fn tls(&self) -> Option<&TlsServerConfig> {
        self.tls.as_ref()
    }
}
