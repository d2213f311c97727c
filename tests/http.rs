//! HTTP transfers against a stand-in server.

use std::fs;
use std::time::Duration;

use kodegen_bundler_installer::bundler::artifact::transfer::acquire;
use kodegen_bundler_installer::bundler::utils::http::download_to_file;
use kodegen_bundler_installer::bundler::{Artifact, ArtifactSource, Error};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Answers one request with `response`, then holds the connection for
/// `linger` before closing it.
async fn serve_once(response: Vec<u8>, linger: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket.write_all(&response).await.unwrap();
        tokio::time::sleep(linger).await;
        let _ = socket.shutdown().await;
    });

    format!("http://{addr}/archive/abc123.zip")
}

fn response(status: &str, content_length: usize, body: &[u8]) -> Vec<u8> {
    let mut bytes = format!(
        "HTTP/1.1 {status}\r\nContent-Length: {content_length}\r\nConnection: close\r\n\r\n"
    )
    .into_bytes();
    bytes.extend_from_slice(body);
    bytes
}

#[tokio::test]
async fn test_download_writes_full_body() {
    let tmp = TempDir::new().unwrap();
    let url = serve_once(response("200 OK", 11, b"hello world"), Duration::ZERO).await;
    let dest = tmp.path().join("abc123.zip");

    let written = download_to_file(&client(), &url, &dest, None).await.unwrap();

    assert_eq!(written, 11);
    assert_eq!(fs::read(&dest).unwrap(), b"hello world");
}

#[tokio::test]
async fn test_error_status_is_a_transfer_error() {
    let tmp = TempDir::new().unwrap();
    let url = serve_once(response("404 Not Found", 0, b""), Duration::ZERO).await;
    let dest = tmp.path().join("abc123.zip");

    let err = download_to_file(&client(), &url, &dest, None).await.unwrap_err();

    match err {
        Error::Transfer { url: failed, reason } => {
            assert_eq!(failed, url);
            assert!(reason.contains("404"), "{reason}");
        }
        other => panic!("expected a transfer error, got {other:?}"),
    }
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_truncated_body_removes_partial_file() {
    let tmp = TempDir::new().unwrap();
    let url = serve_once(response("200 OK", 100, b"0123456789"), Duration::ZERO).await;
    let dest = tmp.path().join("abc123.zip");

    let err = download_to_file(&client(), &url, &dest, None).await.unwrap_err();

    assert!(matches!(err, Error::Transfer { .. }), "{err:?}");
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_cancelled_stream_removes_partial_file() {
    let tmp = TempDir::new().unwrap();
    let url = serve_once(response("200 OK", 100, b"0123"), Duration::from_secs(5)).await;
    let dest = tmp.path().join("abc123.zip");

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let err = download_to_file(&client(), &url, &dest, Some(&token))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled));
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_acquire_replaces_stale_download() {
    let tmp = TempDir::new().unwrap();
    let url = serve_once(response("200 OK", 5, b"fresh"), Duration::ZERO).await;
    fs::write(tmp.path().join("snapshot.zip"), "stale and much longer").unwrap();

    let artifact = Artifact::new(
        "snapshot",
        ArtifactSource::RemoteArchive {
            url,
            file_name: "snapshot.zip".to_string(),
            extract: false,
        },
    );
    let path = acquire(&client(), &artifact, tmp.path(), None).await.unwrap();

    assert_eq!(path, tmp.path().join("snapshot.zip"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "fresh");
}
