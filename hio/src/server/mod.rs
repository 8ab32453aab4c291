/*
 * SPDX-License-Identifier: Apache-2.0
 */

use std::io;
use std::net::SocketAddr;

use tokio::sync::watch;

use hio_socket::{ListenError, TransportListener};

use super::HttpServerConfig;

mod connection;
pub use connection::ServerConnection;

mod handler;
pub use handler::ConnectionHandler;

/// Signals the server loop to stop. The transition is terminal; in-flight
/// connections are dropped with the set.
pub struct ServerQuitHandle {
    quit_tx: watch::Sender<bool>,
}

impl ServerQuitHandle {
    pub fn stop(&self) {
        let _ = self.quit_tx.send(true);
    }
}

/// The accept/dispatch server runtime.
///
/// `run` alternates a bounded accept poll on the listening transport with
/// an insertion-order scan of the connection set, handing each readable
/// connection to the handler. A handler returning false removes the entry
/// and restarts the scan from the top.
pub struct HttpServer {
    config: HttpServerConfig,
    listener: TransportListener,
    connections: Vec<ServerConnection>,
    quit_rx: watch::Receiver<bool>,
    stopped: bool,
}

impl HttpServer {
    pub async fn bind(config: HttpServerConfig) -> Result<(Self, ServerQuitHandle), ListenError> {
        let listener = TransportListener::bind(config.listen_addr(), config.tls().cloned()).await?;
        let (quit_tx, quit_rx) = watch::channel(false);
        Ok((
            HttpServer {
                config,
                listener,
                connections: Vec::new(),
                quit_rx,
                stopped: false,
            },
            ServerQuitHandle { quit_tx },
        ))
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub async fn run<H>(&mut self, handler: &mut H)
    where
        H: ConnectionHandler,
    {
        if self.stopped {
            return;
        }
        match self.local_addr() {
            Ok(addr) => log::info!("server listening on {addr}"),
            Err(_) => log::info!("server listening"),
        }

        loop {
            tokio::select! {
                biased;

                r = self.quit_rx.changed() => {
                    if r.is_err() || *self.quit_rx.borrow() {
                        break;
                    }
                }
                r = tokio::time::timeout(
                    self.config.accept_poll_interval(),
                    self.listener.accept(),
                ) => {
                    match r {
                        Ok(Ok((stream, peer_addr))) => {
                            log::info!("accepted connection from {peer_addr}");
                            self.connections.push(ServerConnection::new(stream, peer_addr));
                        }
                        Ok(Err(e)) => log::warn!("accept failed: {e}"),
                        Err(_) => {} // poll window elapsed with nothing pending
                    }
                }
            }

            self.dispatch(handler).await;
        }

        self.stopped = true;
        self.connections.clear();
        log::info!("server stopped");
    }

    async fn dispatch<H>(&mut self, handler: &mut H)
    where
        H: ConnectionHandler,
    {
        let mut i = 0;
        while i < self.connections.len() {
            let ready = match self.connections[i]
                .readable(self.config.dispatch_poll_interval())
                .await
            {
                Ok(ready) => ready,
                Err(e) => {
                    log::warn!(
                        "connection from {} failed: {e}",
                        self.connections[i].peer_addr()
                    );
                    self.connections.remove(i);
                    i = 0;
                    continue;
                }
            };
            if ready && !handler.handle(&mut self.connections[i]).await {
                let conn = self.connections.remove(i);
                log::info!("closed connection from {}", conn.peer_addr());
                // removal shifts indices, rescan from the top
                i = 0;
                continue;
            }
            i += 1;
        }
    }
}
