//! RequestClient against a one-shot local HTTP server.

use fisio_uploader::api::{Api, MultipartPayload, RequestClient, ResponseOutcome};
use fisio_uploader::config::Config;
use fisio_uploader::error::ClientError;
use fisio_uploader::upload::{SelectedFile, UploadFields};
use serde_json::json;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

struct Captured {
    head: String,
    body: Vec<u8>,
}

impl Captured {
    fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

async fn read_more(socket: &mut TcpStream, buf: &mut Vec<u8>) -> bool {
    let mut chunk = [0u8; 8192];
    let n = socket.read(&mut chunk).await.expect("read request");
    buf.extend_from_slice(&chunk[..n]);
    n > 0
}

async fn read_request(socket: &mut TcpStream) -> Captured {
    let mut buf = Vec::new();
    let head_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
        assert!(read_more(socket, &mut buf).await, "connection closed before headers");
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_ascii_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok());

    let mut body = buf[head_end..].to_vec();
    if let Some(len) = content_length {
        while body.len() < len {
            if !read_more(socket, &mut body).await {
                break;
            }
        }
    } else if head.contains("transfer-encoding: chunked") {
        while !body.ends_with(b"0\r\n\r\n") {
            if !read_more(socket, &mut body).await {
                break;
            }
        }
    }

    Captured { head, body }
}

async fn serve_once(status: u16, body: &'static str) -> (Config, JoinHandle<Captured>) {
    serve_after(Duration::ZERO, status, body).await
}

/// Like `serve_once`, but holds the response back for `delay` after the
/// request has been read.
async fn serve_after(delay: Duration, status: u16, body: &'static str) -> (Config, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        tokio::time::sleep(delay).await;
        let response = format!(
            "HTTP/1.1 {} Test\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        // the client may have given up already
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
        request
    });

    let config = Config {
        api_url: format!("http://{}/api", addr),
        request_timeout_secs: 5,
    };
    (config, handle)
}

#[tokio::test]
async fn get_json_parses_success_body() {
    let (config, server) = serve_once(200, r#"{"status":"ok"}"#).await;
    let client = RequestClient::new(&config).unwrap();

    let outcome = client.get_json("/health").await.unwrap();
    assert_eq!(outcome, ResponseOutcome::Success(json!({"status": "ok"})));

    let request = server.await.unwrap();
    assert!(request.head.starts_with("get /api/health http/1.1"));
}

#[tokio::test]
async fn json_paths_keep_non_json_success_bodies_as_text() {
    let (config, server) = serve_once(200, "ok").await;
    let client = RequestClient::new(&config).unwrap();
    let outcome = client.get_json("/health").await.unwrap();
    assert_eq!(outcome, ResponseOutcome::Success(json!("ok")));
    server.await.unwrap();

    let (config, server) = serve_once(201, "created <b>7</b>").await;
    let client = RequestClient::new(&config).unwrap();
    let outcome = client.post_json("/items", &json!({"name": "Caderno"})).await.unwrap();
    assert_eq!(outcome, ResponseOutcome::Success(json!("created <b>7</b>")));
    server.await.unwrap();
}

#[tokio::test]
async fn get_json_failure_reports_status_only() {
    let (config, server) = serve_once(503, r#"{"detail":"maintenance"}"#).await;
    let client = RequestClient::new(&config).unwrap();

    let outcome = client.get_json("/soma?a=1&b=2").await.unwrap();
    assert_eq!(
        outcome,
        ResponseOutcome::Failure {
            status: 503,
            detail: "Erro na requisição: 503".to_string()
        }
    );

    let request = server.await.unwrap();
    assert!(request.head.starts_with("get /api/soma?a=1&b=2 "));
}

#[tokio::test]
async fn post_json_sends_json_body() {
    let (config, server) = serve_once(201, r#"{"id":7}"#).await;
    let client = RequestClient::new(&config).unwrap();

    let body = json!({"name": "Caderno", "quantity": 2});
    let outcome = client.post_json("/items", &body).await.unwrap();
    assert_eq!(outcome, ResponseOutcome::Success(json!({"id": 7})));

    let request = server.await.unwrap();
    assert!(request.head.starts_with("post /api/items "));
    assert!(request.head.contains("content-type: application/json"));
    let sent: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(sent, body);
}

#[tokio::test]
async fn multipart_failure_uses_detail_and_sends_parts() {
    let (config, server) = serve_once(500, r#"{"detail":"server error"}"#).await;
    let client = RequestClient::new(&config).unwrap();

    let payload = MultipartPayload::new()
        .file("file", "video.mp4", "video/mp4", b"dummy content".to_vec())
        .text("patient_id", "p123");
    let outcome = client.post_multipart("/upload/video", payload).await.unwrap();
    assert_eq!(
        outcome,
        ResponseOutcome::Failure {
            status: 500,
            detail: "server error".to_string()
        }
    );

    let request = server.await.unwrap();
    assert!(request.head.starts_with("post /api/upload/video "));
    assert!(request.head.contains("content-type: multipart/form-data; boundary="));
    let body = request.body_text();
    assert!(body.contains(r#"name="file"; filename="video.mp4""#));
    assert!(body.contains("dummy content"));
    assert!(body.contains(r#"name="patient_id""#));
    assert!(body.contains("p123"));
    assert!(!body.contains("exercise_id"));
}

#[tokio::test]
async fn multipart_plain_text_bodies_are_kept() {
    let (config, server) = serve_once(502, "upstream unavailable").await;
    let client = RequestClient::new(&config).unwrap();
    let payload = MultipartPayload::new().file("file", "video.mp4", "video/mp4", vec![0, 1, 2]);
    let outcome = client.post_multipart("/upload/video", payload).await.unwrap();
    assert_eq!(
        outcome,
        ResponseOutcome::Failure {
            status: 502,
            detail: "upstream unavailable".to_string()
        }
    );
    server.await.unwrap();

    let (config, server) = serve_once(201, "stored").await;
    let client = RequestClient::new(&config).unwrap();
    let payload = MultipartPayload::new().file("file", "video.mp4", "video/mp4", vec![0, 1, 2]);
    let outcome = client.post_multipart("/upload/video", payload).await.unwrap();
    assert_eq!(outcome, ResponseOutcome::Success(json!("stored")));
    server.await.unwrap();
}

#[tokio::test]
async fn selected_disk_file_is_streamed_from_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agachamento.mp4");
    std::fs::write(&path, b"frames read at send time").unwrap();
    let file = SelectedFile::from_path(&path).unwrap();
    let fields = UploadFields {
        patient_id: String::new(),
        exercise_id: "squat".to_string(),
    };

    let (config, server) = serve_once(200, r#"{"filename":"4f2a.mp4"}"#).await;
    let client = RequestClient::new(&config).unwrap();
    let outcome = client
        .post_multipart("/upload/video", fields.build_payload(&file))
        .await
        .unwrap();
    assert_eq!(outcome, ResponseOutcome::Success(json!({"filename": "4f2a.mp4"})));

    let body = server.await.unwrap().body_text();
    assert!(body.contains(r#"name="file"; filename="agachamento.mp4""#));
    assert!(body.contains("Content-Type: video/mp4"));
    assert!(body.contains("frames read at send time"));
    assert!(body.contains("squat"));
}

#[tokio::test]
async fn uploads_are_not_cut_off_by_the_request_timeout() {
    let (mut config, server) = serve_after(Duration::from_millis(1500), 201, r#"{"filename":"slow.mp4"}"#).await;
    config.request_timeout_secs = 1;
    let client = RequestClient::new(&config).unwrap();

    let payload = MultipartPayload::new().file("file", "slow.mp4", "video/mp4", vec![0; 1024]);
    let outcome = client.post_multipart("/upload/video", payload).await.unwrap();
    assert_eq!(outcome, ResponseOutcome::Success(json!({"filename": "slow.mp4"})));
    server.await.unwrap();
}

#[tokio::test]
async fn json_requests_time_out() {
    let (mut config, _server) = serve_after(Duration::from_millis(1500), 200, r#"{"status":"ok"}"#).await;
    config.request_timeout_secs = 1;
    let client = RequestClient::new(&config).unwrap();

    let result = client.get_json("/health").await;
    assert!(matches!(result, Err(ClientError::Transport(_))));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = Config {
        api_url: format!("http://{}/api", addr),
        request_timeout_secs: 5,
    };
    let client = RequestClient::new(&config).unwrap();

    let result = client.get_json("/health").await;
    assert!(matches!(result, Err(ClientError::Transport(_))));
}
