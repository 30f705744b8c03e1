//! Malformed, oversized and stalled requests.

use std::time::Duration;

use reqwest::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

mod common;

#[tokio::test]
async fn malformed_bodies_never_reach_the_store() {
    let server = common::start_server(common::local_config()).await;
    let client = reqwest::Client::new();
    let before = server.store.all().unwrap();

    let bodies = [
        "",
        "{",
        "[]",
        r#"{"name":"Tea"}"#,
        r#"{"name":"Tea","price":"free","sku":"t"}"#,
        r#"{"name":"","price":1,"sku":"t"}"#,
        r#"{"name":"Tea","price":-1,"sku":"t"}"#,
    ];
    for body in bodies {
        let res = client.post(server.url()).body(body).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "POST {body:?}");

        let res = client.put(format!("{}/1", server.url())).body(body).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "PUT {body:?}");
    }

    assert_eq!(server.store.all().unwrap(), before);
    server.stop().await.unwrap();
}

#[tokio::test]
async fn oversized_body_is_413() {
    let mut config = common::local_config();
    config.limits.max_body_bytes = 64;
    let server = common::start_server(config).await;

    let body = format!(r#"{{"name":"{}","price":1,"sku":"t"}}"#, "x".repeat(256));
    let res = reqwest::Client::new().post(server.url()).body(body).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(server.store.len(), 2);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn stalled_body_hits_read_timeout() {
    let mut config = common::local_config();
    config.timeouts.read_secs = 1;
    let server = common::start_server(config).await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream
        .write_all(b"POST / HTTP/1.1\r\nHost: test\r\nContent-Length: 100\r\n\r\n{\"name\":")
        .await
        .unwrap();

    let mut response = Vec::new();
    let read = tokio::time::timeout(Duration::from_secs(5), async {
        let mut buf = [0u8; 1024];
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            response.extend_from_slice(&buf[..n]);
            if response.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
    })
    .await;
    assert!(read.is_ok(), "server never answered the stalled request");

    let text = String::from_utf8_lossy(&response);
    assert!(text.starts_with("HTTP/1.1 408"), "unexpected response: {text}");
    assert_eq!(server.store.len(), 2);

    server.stop().await.unwrap();
}
