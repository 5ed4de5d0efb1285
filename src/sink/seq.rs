use super::{BatchSink, Result, SinkError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;

const RAW_EVENTS_PATH: &str = "/api/events/raw";
const API_KEY_HEADER: &str = "X-Seq-ApiKey";

/// HTTP sink for a Seq-compatible raw event ingestion endpoint.
///
/// One blocking-from-the-tick's-perspective POST per batch; any 2xx response
/// acknowledges the batch, anything else is reported with its status and
/// body for diagnostics.
pub struct SeqSink {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl SeqSink {
    pub fn new(server_url: &str, api_key: Option<&str>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{}", server_url.trim_end_matches('/'), RAW_EVENTS_PATH),
            api_key: normalize_api_key(api_key),
        })
    }
}

/// A blank or whitespace-only key means no key header at all.
fn normalize_api_key(api_key: Option<&str>) -> Option<String> {
    api_key
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}

/// Join raw lines into the `{"events":[...]}` wire envelope.
///
/// Lines are trusted to already be valid JSON objects and are inserted
/// verbatim, never re-parsed.
pub fn envelope(lines: &[String]) -> String {
    let payload_len: usize = lines.iter().map(|line| line.len() + 1).sum();
    let mut body = String::with_capacity(payload_len + 12);
    body.push_str("{\"events\":[");
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            body.push(',');
        }
        body.push_str(line);
    }
    body.push_str("]}");
    body
}

#[async_trait]
impl BatchSink for SeqSink {
    async fn send(&self, lines: &[String]) -> Result<()> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .body(envelope(lines));
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            debug!(lines = lines.len(), status = status.as_u16(), "Batch accepted");
            return Ok(());
        }

        Err(SinkError::Server {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_envelope_joins_lines_verbatim() {
        let lines = vec!["{\"n\":1}".to_string(), "{\"n\":2}".to_string()];
        assert_eq!(envelope(&lines), "{\"events\":[{\"n\":1},{\"n\":2}]}");
    }

    #[test]
    fn test_envelope_is_valid_json() {
        let lines = vec![
            "{\"msg\":\"héllo\"}".to_string(),
            "{\"nested\":{\"a\":[1,2]}}".to_string(),
        ];
        let parsed: serde_json::Value = serde_json::from_str(&envelope(&lines)).unwrap();
        assert_eq!(parsed["events"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_envelope_of_empty_batch() {
        assert_eq!(envelope(&[]), "{\"events\":[]}");
    }

    #[test]
    fn test_blank_api_key_is_dropped() {
        assert_eq!(normalize_api_key(None), None);
        assert_eq!(normalize_api_key(Some("")), None);
        assert_eq!(normalize_api_key(Some("   ")), None);
        assert_eq!(normalize_api_key(Some(" key ")), Some("key".to_string()));
    }

    /// One-shot HTTP server that captures the request text and replies with
    /// the given status line.
    async fn capture_one_request(status_line: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 16 * 1024];
            let mut read = 0;
            loop {
                let n = socket.read(&mut buf[read..]).await.unwrap();
                read += n;
                let text = String::from_utf8_lossy(&buf[..read]);
                if n == 0 || text.contains("]}") {
                    break;
                }
            }
            let response = format!("{status_line}\r\ncontent-length: 4\r\nconnection: close\r\n\r\nbody");
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&buf[..read]).to_string()
        });
        (format!("http://{addr}"), handle)
    }

    #[tokio::test]
    async fn test_send_posts_envelope_with_api_key() {
        let (url, server) = capture_one_request("HTTP/1.1 201 Created").await;
        let sink = SeqSink::new(&url, Some("secret"), Duration::from_secs(5)).unwrap();

        sink.send(&["{\"n\":1}".to_string()]).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/events/raw HTTP/1.1"));
        assert!(request.to_lowercase().contains("x-seq-apikey: secret"));
        assert!(request
            .to_lowercase()
            .contains("content-type: application/json; charset=utf-8"));
        assert!(request.ends_with("{\"events\":[{\"n\":1}]}"));
    }

    #[tokio::test]
    async fn test_send_without_key_omits_header() {
        let (url, server) = capture_one_request("HTTP/1.1 200 OK").await;
        let sink = SeqSink::new(&url, Some("  "), Duration::from_secs(5)).unwrap();

        sink.send(&["{\"n\":1}".to_string()]).await.unwrap();

        let request = server.await.unwrap();
        assert!(!request.to_lowercase().contains("x-seq-apikey"));
    }

    #[tokio::test]
    async fn test_non_2xx_is_a_server_error_with_diagnostics() {
        let (url, server) = capture_one_request("HTTP/1.1 503 Service Unavailable").await;
        let sink = SeqSink::new(&url, None, Duration::from_secs(5)).unwrap();

        let err = sink.send(&["{\"n\":1}".to_string()]).await.unwrap_err();
        match err {
            SinkError::Server { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "body");
            }
            other => panic!("expected server error, got {other:?}"),
        }
        server.await.unwrap();
    }
}
