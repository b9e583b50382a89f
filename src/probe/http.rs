// ABOUTME: Bounded-timeout endpoint checks over a local tunnel port.
// ABOUTME: HTTP checks issue one GET with hyper; TCP checks only open a connection.

use crate::config::ProbeKind;
use bytes::Bytes;
use http_body_util::Empty;
use hyper_util::rt::TokioIo;
use std::io::ErrorKind;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;

/// What one endpoint check observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointCheck {
    pub http_status: Option<u16>,
    pub latency: Duration,
    /// Set when no answer was received at all.
    pub error: Option<String>,
}

/// Check an endpoint on `127.0.0.1:port`, giving up after `timeout`.
///
/// Never retries. On timeout the recorded latency is at least `timeout`.
pub async fn check_endpoint(
    kind: ProbeKind,
    port: u16,
    path: &str,
    timeout: Duration,
) -> EndpointCheck {
    let start = Instant::now();
    let attempt = async {
        match kind {
            ProbeKind::Http => http_get(port, path).await.map(Some),
            ProbeKind::Tcp => tcp_connect(port).await.map(|()| None),
        }
    };

    match tokio::time::timeout(timeout, attempt).await {
        Ok(Ok(http_status)) => EndpointCheck {
            http_status,
            latency: start.elapsed(),
            error: None,
        },
        Ok(Err(error)) => EndpointCheck {
            http_status: None,
            latency: start.elapsed(),
            error: Some(error),
        },
        Err(_elapsed) => EndpointCheck {
            http_status: None,
            latency: start.elapsed().max(timeout),
            error: Some(format!("timed out after {:.1}s", timeout.as_secs_f64())),
        },
    }
}

async fn connect(port: u16) -> Result<TcpStream, String> {
    TcpStream::connect(("127.0.0.1", port))
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::ConnectionRefused => "connection refused".to_string(),
            _ => format!("connection failed: {e}"),
        })
}

async fn tcp_connect(port: u16) -> Result<(), String> {
    connect(port).await.map(drop)
}

async fn http_get(port: u16, path: &str) -> Result<u16, String> {
    let stream = connect(port).await?;
    let io = TokioIo::new(stream);

    let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
        .await
        .map_err(|e| format!("HTTP handshake failed: {e}"))?;

    let req = hyper::Request::builder()
        .method("GET")
        .uri(path)
        .header("Host", format!("127.0.0.1:{port}"))
        .header("User-Agent", concat!("kubeship/", env!("CARGO_PKG_VERSION")))
        .body(Empty::<Bytes>::new())
        .map_err(|e| format!("failed to build request: {e}"))?;

    // Drive the connection inline so a timeout cancels both halves.
    let mut conn = std::pin::pin!(conn);
    tokio::select! {
        biased;
        response = sender.send_request(req) => response
            .map(|resp| resp.status().as_u16())
            .map_err(|e| format!("request failed: {e}")),
        result = &mut conn => Err(match result {
            Ok(()) => "connection closed before response".to_string(),
            Err(e) => format!("connection error: {e}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn respond_once(status_line: &'static str) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!("HTTP/1.1 {status_line}\r\ncontent-length: 0\r\n\r\n");
            let _ = socket.write_all(response.as_bytes()).await;
        });
        port
    }

    #[tokio::test]
    async fn http_check_reports_status() {
        let port = respond_once("301 Moved Permanently").await;
        let check = check_endpoint(ProbeKind::Http, port, "/", Duration::from_secs(2)).await;
        assert_eq!(check.http_status, Some(301));
        assert!(check.error.is_none());
    }

    #[tokio::test]
    async fn refused_connection_is_reported() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let check = check_endpoint(ProbeKind::Http, port, "/", Duration::from_secs(2)).await;
        assert_eq!(check.http_status, None);
        assert_eq!(check.error.as_deref(), Some("connection refused"));
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let timeout = Duration::from_millis(300);
        let check = check_endpoint(ProbeKind::Http, port, "/", timeout).await;
        assert_eq!(check.http_status, None);
        assert!(check.latency >= timeout);
        assert!(check.error.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn tcp_check_only_needs_a_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let check = check_endpoint(ProbeKind::Tcp, port, "/", Duration::from_secs(1)).await;
        assert_eq!(check.http_status, None);
        assert!(check.error.is_none());
        drop(listener);
    }
}
