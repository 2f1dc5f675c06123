use std::time::Duration;

use reqwest::{Client, Response};

use super::ProbeError;

/// A client that keeps no idle connections, so every check dials fresh.
pub(crate) fn fresh_client(timeout: Duration) -> Result<Client, ProbeError> {
    Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(0)
        .build()
        .map_err(ProbeError::Build)
}

/// Drains at most `limit` bytes of the response body.
pub(crate) async fn read_limited(
    mut response: Response,
    limit: usize,
) -> Result<Vec<u8>, ProbeError> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(ProbeError::Read)? {
        let room = limit - body.len();
        if chunk.len() >= room {
            body.extend_from_slice(&chunk[..room]);
            if chunk.len() > room {
                log::debug!("response body truncated at {} bytes", limit);
            }
            break;
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Serves one response per connection that promises a 100 byte body,
/// sends a few bytes of it and hangs up.
#[cfg(test)]
pub(crate) async fn serve_truncated_body() -> String {
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut sock, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = sock.read(&mut buf).await;
            let _ = sock
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\npartial")
                .await;
            let _ = sock.shutdown().await;
        }
    });
    format!("http://{}/", addr)
}
