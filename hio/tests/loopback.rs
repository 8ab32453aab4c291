/*
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use hio::{
    ConnectionHandler, ExchangeError, ExchangeHandle, HttpClientConfig, HttpConnection,
    HttpMultiConnection, HttpServer, HttpServerConfig, HttpTaskFanout, ServerConnection,
    WindowPolicy,
};
use hio_http::server::HttpRequestHead;
use hio_http::{BodyFraming, HttpBodyReader, Method};

fn client_config(port: u16) -> Arc<HttpClientConfig> {
    let mut config = HttpClientConfig::new("127.0.0.1", port);
    config.set_timeout(Duration::from_millis(300));
    Arc::new(config)
}

/// A scripted peer: accept connections, consume one request head per
/// scripted response, write the response bytes verbatim.
async fn scripted_listener(conns: usize, responses: Vec<&'static [u8]>) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        for _ in 0..conns {
            let (mut sock, _) = listener.accept().await.unwrap();
            let responses = responses.clone();
            tokio::spawn(async move {
                for rsp in responses {
                    read_request_head(&mut sock).await;
                    sock.write_all(rsp).await.unwrap();
                }
            });
        }
    });
    port
}

async fn read_request_head(sock: &mut TcpStream) -> Vec<u8> {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        if sock.read_exact(&mut byte).await.is_err() {
            break;
        }
        head.push(byte[0]);
    }
    head
}

#[tokio::test]
async fn single_exchange_and_reuse() {
    let port = scripted_listener(
        1,
        vec![
            b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello",
            b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nworld",
        ],
    )
    .await;

    let mut conn = HttpConnection::connect(client_config(port)).await.unwrap();

    let mut handle = ExchangeHandle::new(Method::Get, "/first");
    conn.perform(&mut handle).await.unwrap();
    let head = handle.response_head().unwrap();
    assert_eq!(head.code, 200);
    assert_eq!(handle.response_body(), b"hello");
    assert_eq!(handle.response_body_size(), 5);

    // same connection, fresh handle, no residual state
    let mut handle = ExchangeHandle::new(Method::Get, "/second");
    conn.perform(&mut handle).await.unwrap();
    assert_eq!(handle.response_body(), b"world");
}

#[tokio::test]
async fn chunked_body_per_chunk_callback() {
    let port = scripted_listener(
        1,
        vec![b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n3\r\nfoo\r\n4\r\nbars\r\n0\r\n\r\n"],
    )
    .await;

    let mut conn = HttpConnection::connect(client_config(port)).await.unwrap();
    let mut handle = ExchangeHandle::new(Method::Get, "/chunks");
    let (tx, rx) = std::sync::mpsc::channel::<Vec<u8>>();
    handle.set_callback(move |data| {
        tx.send(data.to_vec()).unwrap();
    });
    conn.perform(&mut handle).await.unwrap();

    let chunks: Vec<Vec<u8>> = rx.try_iter().collect();
    assert_eq!(chunks, vec![b"foo".to_vec(), b"bars".to_vec()]);
    assert_eq!(handle.response_body_size(), 7);
    // callback consumed the bytes, nothing was aggregated
    assert!(handle.response_body().is_empty());
}

#[tokio::test]
async fn missing_framing_fails_exchange() {
    let port = scripted_listener(1, vec![b"HTTP/1.1 200 OK\r\nServer: x\r\n\r\n"]).await;

    let mut conn = HttpConnection::connect(client_config(port)).await.unwrap();
    let mut handle = ExchangeHandle::new(Method::Get, "/");
    let r = conn.perform(&mut handle).await;
    assert!(matches!(r, Err(ExchangeError::NoBodyFraming)));
    // the head phase still completed
    assert!(handle.response_head().is_some());
}

#[tokio::test]
async fn invalid_request_fails_before_io() {
    let port = scripted_listener(1, vec![]).await;

    let mut conn = HttpConnection::connect(client_config(port)).await.unwrap();
    let mut handle = ExchangeHandle::new(Method::Get, "/");
    handle.set_body(b"not allowed".to_vec());
    let r = conn.perform(&mut handle).await;
    assert!(matches!(r, Err(ExchangeError::InvalidRequest(_))));
}

#[tokio::test]
async fn stream_ends_on_idle() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        read_request_head(&mut sock).await;
        sock.write_all(b"HTTP/1.1 200 OK\r\nServer: x\r\n\r\nstreamed bytes")
            .await
            .unwrap();
        // stay connected but silent, the client ends on idle
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let mut conn = HttpConnection::connect(client_config(port)).await.unwrap();
    let mut handle = ExchangeHandle::new(Method::Get, "/stream");
    conn.perform_stream(&mut handle).await.unwrap();
    assert_eq!(handle.response_body(), b"streamed bytes");
    assert_eq!(handle.response_body_size(), 14);
}

#[tokio::test]
async fn multi_skips_failed_slots() {
    let good_port = scripted_listener(
        1,
        vec![b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok"],
    )
    .await;
    // bound then dropped, connect gets refused
    let dead = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_port = dead.local_addr().unwrap().port();
    drop(dead);

    let mut multi = HttpMultiConnection::connect_each(vec![
        client_config(good_port),
        client_config(dead_port),
    ])
    .await
    .unwrap();
    assert_eq!(multi.slot_count(), 2);
    assert_eq!(multi.connected_count(), 1);
    assert!(multi.slot_flags()[0].connected);
    assert!(!multi.slot_flags()[1].connected);

    let mut handles = vec![
        ExchangeHandle::new(Method::Get, "/a"),
        ExchangeHandle::new(Method::Get, "/b"),
    ];
    multi
        .perform(&mut handles, Duration::from_millis(500))
        .await
        .unwrap();
    assert_eq!(handles[0].response_body(), b"ok");
    assert!(handles[1].response_head().is_none());
}

#[tokio::test]
async fn multi_all_slots_failed_is_construction_error() {
    let dead = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_port = dead.local_addr().unwrap().port();
    drop(dead);

    let r = HttpMultiConnection::connect(client_config(dead_port), 3).await;
    assert!(r.is_err());
}

#[tokio::test]
async fn multi_deadline_leaves_partial_state() {
    let fast_port = scripted_listener(
        1,
        vec![b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\n\r\nfast"],
    )
    .await;
    // accepts, reads the request, never responds
    let slow = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let slow_port = slow.local_addr().unwrap().port();
    tokio::spawn(async move {
        let (mut sock, _) = slow.accept().await.unwrap();
        read_request_head(&mut sock).await;
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let mut multi = HttpMultiConnection::connect_each(vec![
        client_config(fast_port),
        client_config(slow_port),
    ])
    .await
    .unwrap();
    let mut handles = vec![
        ExchangeHandle::new(Method::Get, "/fast"),
        ExchangeHandle::new(Method::Get, "/slow"),
    ];
    // the deadline cuts the slow slot short, the call still succeeds
    multi
        .perform(&mut handles, Duration::from_millis(200))
        .await
        .unwrap();

    let flags = multi.slot_flags();
    assert!(!flags[0].sent);
    assert!(!flags[0].header_received);
    assert_eq!(flags[0].content_length, Some(4));
    assert_eq!(handles[0].response_body(), b"fast");

    // the slow slot stays marked sent with nothing received
    assert!(flags[1].sent);
    assert!(!flags[1].header_received);
    assert!(handles[1].response_head().is_none());
}

#[tokio::test]
async fn multi_nothing_sent_fails() {
    let port = scripted_listener(1, vec![]).await;
    let mut multi = HttpMultiConnection::connect(client_config(port), 1)
        .await
        .unwrap();
    // GET with a body fails validation, so no request goes out
    let mut handles = vec![ExchangeHandle::new(Method::Get, "/")];
    handles[0].set_body(b"x".to_vec());
    let r = multi.perform(&mut handles, Duration::from_millis(100)).await;
    assert!(matches!(r, Err(ExchangeError::NoRequestSent)));
}

/// Serves every connection, responding with the request target as the body.
async fn echo_target_listener(conns: usize) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        for _ in 0..conns {
            let (mut sock, _) = listener.accept().await.unwrap();
            tokio::spawn(async move {
                let head = read_request_head(&mut sock).await;
                let line = String::from_utf8_lossy(&head);
                let target = line.split_whitespace().nth(1).unwrap_or("?").to_string();
                let rsp = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n{}",
                    target.len(),
                    target
                );
                sock.write_all(rsp.as_bytes()).await.unwrap();
            });
        }
    });
    port
}

#[tokio::test]
async fn fanout_results_in_handle_order() {
    let port = echo_target_listener(5).await;
    let handles: Vec<ExchangeHandle> = (0..5)
        .map(|i| ExchangeHandle::new(Method::Get, format!("/task/{i}")))
        .collect();

    let mut fanout = HttpTaskFanout::new(client_config(port), handles);
    let results = fanout.perform(2, WindowPolicy::WaitAll).await;
    assert_eq!(results.len(), 5);
    for (i, r) in results.iter().enumerate() {
        r.as_ref().unwrap();
        let handle = fanout.handle(i).unwrap();
        assert_eq!(
            handle.response_body(),
            format!("/task/{i}").as_bytes()
        );
    }
}

#[tokio::test]
async fn fanout_wait_any_completes_all() {
    let port = echo_target_listener(4).await;
    let handles: Vec<ExchangeHandle> = (0..4)
        .map(|i| ExchangeHandle::new(Method::Get, format!("/{i}")))
        .collect();

    let mut fanout = HttpTaskFanout::new(client_config(port), handles);
    let results = fanout.perform(3, WindowPolicy::WaitAny).await;
    assert!(results.iter().all(|r| r.is_ok()));
    for i in 0..4 {
        assert_eq!(
            fanout.handle(i).unwrap().response_body(),
            format!("/{i}").as_bytes()
        );
    }
}

#[tokio::test]
async fn fanout_reports_connect_failures() {
    let dead = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_port = dead.local_addr().unwrap().port();
    drop(dead);

    let handles = vec![
        ExchangeHandle::new(Method::Get, "/a"),
        ExchangeHandle::new(Method::Get, "/b"),
    ];
    let mut fanout = HttpTaskFanout::new(client_config(dead_port), handles);
    let results = fanout.perform(2, WindowPolicy::WaitAll).await;
    assert!(
        results
            .iter()
            .all(|r| matches!(r, Err(ExchangeError::ConnectFailed(_))))
    );
}

struct TargetEchoHandler {
    keep_alive: bool,
}

#[async_trait]
impl ConnectionHandler for TargetEchoHandler {
    async fn handle(&mut self, conn: &mut ServerConnection) -> bool {
        let Ok(head) = HttpRequestHead::parse(conn, 4096).await else {
            return false;
        };
        // drain the request body so the next scan starts at a request line
        if let BodyFraming::ContentLength(n) = head.body_framing() {
            let mut body = Vec::new();
            let mut reader = HttpBodyReader::new(conn, Duration::from_millis(200));
            if reader.read_fixed(n, &mut body).await.is_err() {
                return false;
            }
        }
        let rsp = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n{}",
            head.target.len(),
            head.target
        );
        if conn.write_all(rsp.as_bytes()).await.is_err() {
            return false;
        }
        if conn.flush().await.is_err() {
            return false;
        }
        self.keep_alive
    }
}

#[tokio::test]
async fn server_round_trip_keep_alive() {
    let mut server_config = HttpServerConfig::new("127.0.0.1:0".parse().unwrap());
    server_config.set_accept_poll_interval(Duration::from_millis(20));
    server_config.set_dispatch_poll_interval(Duration::from_millis(5));
    let (mut server, quit) = HttpServer::bind(server_config).await.unwrap();
    let port = server.local_addr().unwrap().port();

    let task = tokio::spawn(async move {
        let mut handler = TargetEchoHandler { keep_alive: true };
        server.run(&mut handler).await;
        server
    });

    let mut conn = HttpConnection::connect(client_config(port)).await.unwrap();
    let mut handle = ExchangeHandle::new(Method::Get, "/one");
    conn.perform(&mut handle).await.unwrap();
    assert_eq!(handle.response_body(), b"/one");

    // the connection stayed in the dispatch set
    let mut handle = ExchangeHandle::new(Method::Post, "/two");
    handle.set_body(b"payload".to_vec());
    conn.perform(&mut handle).await.unwrap();
    assert_eq!(handle.response_body(), b"/two");

    quit.stop();
    let server = task.await.unwrap();
    assert_eq!(server.connection_count(), 0);
}

#[tokio::test]
async fn server_handler_false_removes_connection() {
    let mut server_config = HttpServerConfig::new("127.0.0.1:0".parse().unwrap());
    server_config.set_accept_poll_interval(Duration::from_millis(20));
    server_config.set_dispatch_poll_interval(Duration::from_millis(5));
    let (mut server, quit) = HttpServer::bind(server_config).await.unwrap();
    let port = server.local_addr().unwrap().port();

    let task = tokio::spawn(async move {
        let mut handler = TargetEchoHandler { keep_alive: false };
        server.run(&mut handler).await;
    });

    let mut conn = HttpConnection::connect(client_config(port)).await.unwrap();
    let mut handle = ExchangeHandle::new(Method::Get, "/once");
    conn.perform(&mut handle).await.unwrap();
    assert_eq!(handle.response_body(), b"/once");

    // the server dropped the connection, a second exchange cannot complete
    let mut handle = ExchangeHandle::new(Method::Get, "/again");
    let r = conn.perform(&mut handle).await;
    assert!(r.is_err());

    quit.stop();
    task.await.unwrap();
}
