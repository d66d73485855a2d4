#![allow(dead_code)]

use mockito::{Matcher, Mock, ServerGuard};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use avatar_proxy::config::AvatarConfig;

pub const HASH: &str = "9e107d9d372bb6826bd81d3542a419d6";
pub const PLACEHOLDER_BYTES: &[u8] = b"\x89PNG placeholder";

/// Placeholder image on disk; keep it alive until the service is built
pub fn placeholder_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(PLACEHOLDER_BYTES).unwrap();
    file
}

pub fn avatar_config(base_url: String, placeholder: &NamedTempFile) -> AvatarConfig {
    AvatarConfig {
        base_url,
        workers: 2,
        placeholder_path: placeholder.path().to_path_buf(),
        ..AvatarConfig::default()
    }
}

pub fn mock_base_url(server: &ServerGuard) -> String {
    format!("{}/avatar/", server.url())
}

/// Primary image request: `?d=retro&size=200&r=pg`
pub async fn mock_image(
    server: &mut ServerGuard,
    hash: &str,
    status: usize,
    body: &str,
    hits: usize,
) -> Mock {
    server
        .mock("GET", format!("/avatar/{hash}").as_str())
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("d".into(), "retro".into()),
            Matcher::UrlEncoded("size".into(), "200".into()),
            Matcher::UrlEncoded("r".into(), "pg".into()),
        ]))
        .with_status(status)
        .with_header("content-type", "image/jpeg")
        .with_body(body)
        .expect(hits)
        .create_async()
        .await
}

/// Custom-image probe: `?d=404`
pub async fn mock_probe(server: &mut ServerGuard, hash: &str, status: usize, hits: usize) -> Mock {
    server
        .mock("GET", format!("/avatar/{hash}").as_str())
        .match_query(Matcher::UrlEncoded("d".into(), "404".into()))
        .with_status(status)
        .expect(hits)
        .create_async()
        .await
}

/// Upstream that accepts connections and never answers
pub async fn silent_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    format!("http://{addr}/avatar/")
}

/// Upstream that serves the image request and drops the probe connection
pub async fn probe_dropping_upstream(body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                if String::from_utf8_lossy(&request).contains("d=retro") {
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                }
                // probe: close without answering
            });
        }
    });

    format!("http://{addr}/avatar/")
}

/// Base URL of a port with nothing listening
pub async fn closed_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/avatar/")
}

pub const SHORT_WAIT: Duration = Duration::from_millis(300);
