#![allow(dead_code)]

use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A local server that answers each accepted connection with the next canned
/// reply, then closes it. The handle resolves to the raw requests it saw.
pub struct Canned {
    pub port: u16,
    pub handle: JoinHandle<Vec<String>>,
}

pub async fn serve(replies: Vec<Vec<u8>>) -> Canned {
    serve_with_delay(replies, Duration::ZERO).await
}

/// Like [`serve`] but holds each connection open for `hold` after replying.
pub async fn serve_with_delay(replies: Vec<Vec<u8>>, hold: Duration) -> Canned {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let mut seen = Vec::new();
        for reply in replies {
            let (mut sock, _) = listener.accept().await.unwrap();
            seen.push(read_request(&mut sock).await);
            sock.write_all(&reply).await.unwrap();
            if !hold.is_zero() {
                tokio::time::sleep(hold).await;
            }
            let _ = sock.shutdown().await;
        }
        seen
    });

    Canned { port, handle }
}

async fn read_request(sock: &mut tokio::net::TcpStream) -> String {
    let mut buf = BytesMut::with_capacity(1024);
    loop {
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
        match sock.read_buf(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

pub fn reply(status: &str, headers: &[(&str, &str)], body: &str) -> Vec<u8> {
    let mut out = format!("HTTP/1.1 {}\r\n", status);
    for (k, v) in headers {
        out.push_str(&format!("{}: {}\r\n", k, v));
    }
    out.push_str("\r\n");
    out.push_str(body);
    out.into_bytes()
}

/// Serves one reply, then waits for the client to close its side.
///
/// With `half_close` the server shuts down its write half after replying, so
/// the client sees EOF; otherwise it keeps the connection open. The handle
/// resolves to how long the client took to close after the reply was sent.
pub async fn serve_and_watch_close(reply: Vec<u8>, half_close: bool) -> (u16, JoinHandle<Duration>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        read_request(&mut sock).await;
        sock.write_all(&reply).await.unwrap();
        if half_close {
            sock.shutdown().await.unwrap();
        }
        let sent = tokio::time::Instant::now();

        let mut rest = [0u8; 64];
        let n = tokio::time::timeout(Duration::from_secs(5), sock.read(&mut rest))
            .await
            .expect("client never closed the connection")
            .unwrap();
        assert_eq!(n, 0, "client sent more data instead of closing");
        sent.elapsed()
    });

    (port, handle)
}
