//! Local fixture server helpers

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve `body` as `text/html` to every request until the task is aborted
///
/// Returns the base URL and the server task.
#[allow(dead_code)]
pub async fn serve_html(body: &'static str) -> (String, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Should bind fixture server");
    let addr = listener.local_addr().expect("Should have local addr");

    let handle = tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    (format!("http://{}/", addr), handle)
}

/// A URL on a local port with nothing listening
#[allow(dead_code)]
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Should bind a free port");
    let port = listener.local_addr().expect("Should have local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}
