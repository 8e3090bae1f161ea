use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use gemini_api::{
    Content, FailureKind, FinishReason, GeminiApiClient, GeminiApiConfig, GeminiApiError,
    GenerateContentRequest,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Duration};

fn allow_local_integration() -> bool {
    std::env::var("SECRETARY_ALLOW_LOCAL_INTEGRATION")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false)
}

#[derive(Clone)]
struct ResponseChunk {
    delay_ms: u64,
    bytes: Vec<u8>,
}

#[derive(Clone)]
struct ScriptedResponse {
    status: u16,
    content_type: &'static str,
    chunks: Vec<ResponseChunk>,
}

struct ScriptedServer {
    base_url: String,
    request_count: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl ScriptedServer {
    async fn new(scripts: Vec<ScriptedResponse>) -> Self {
        let scripts = Arc::new(scripts);
        let request_count = Arc::new(AtomicUsize::new(0));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("local TCP listener should bind");
        let addr = listener
            .local_addr()
            .expect("resolved local listener address");
        let base_url = format!("http://{addr}");

        let handle = tokio::spawn({
            let scripts = Arc::clone(&scripts);
            let request_count = Arc::clone(&request_count);

            async move {
                while let Ok((socket, _)) = listener.accept().await {
                    let scripts = Arc::clone(&scripts);
                    let request_count = Arc::clone(&request_count);
                    tokio::spawn(async move {
                        serve_one(socket, scripts, request_count).await;
                    });
                }
            }
        });

        Self {
            base_url,
            request_count,
            handle,
        }
    }

    fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Acquire)
    }

    fn shutdown(&self) {
        self.handle.abort();
    }
}

fn response_sse(frames: &[&str]) -> ScriptedResponse {
    ScriptedResponse {
        status: 200,
        content_type: "text/event-stream",
        chunks: vec![ResponseChunk {
            delay_ms: 0,
            bytes: sse_frames(frames),
        }],
    }
}

fn response_json(status: u16, body: &str) -> ScriptedResponse {
    ScriptedResponse {
        status,
        content_type: "application/json",
        chunks: vec![ResponseChunk {
            delay_ms: 0,
            bytes: body.as_bytes().to_vec(),
        }],
    }
}

fn sse_frames(frames: &[&str]) -> Vec<u8> {
    let mut body = String::new();
    for frame in frames {
        body.push_str("data: ");
        body.push_str(frame);
        body.push_str("\r\n\r\n");
    }
    body.into_bytes()
}

fn client_for(server: &ScriptedServer) -> GeminiApiClient {
    let config = GeminiApiConfig::new("test-key").with_base_url(&server.base_url);
    GeminiApiClient::new(config).expect("client")
}

fn hello_request() -> GenerateContentRequest {
    GenerateContentRequest::new(Some("sys".to_string()), vec![Content::user("hi")])
}

#[tokio::test]
async fn stream_integration_collects_text_and_finish_reason() {
    if !allow_local_integration() {
        return;
    }

    let server = ScriptedServer::new(vec![response_sse(&[
        r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hello, "}]}}]}"#,
        r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"what did you do?"}]},"finishReason":"STOP"}]}"#,
    ])])
    .await;

    let result = client_for(&server)
        .stream(&hello_request(), None)
        .await
        .expect("stream should succeed");

    assert_eq!(result.text(), "Hello, what did you do?");
    assert_eq!(result.finish_reason, Some(FinishReason::Stop));
    assert_eq!(server.request_count(), 1);

    server.shutdown();
}

#[tokio::test]
async fn stream_integration_rate_limit_is_classified_not_retried() {
    if !allow_local_integration() {
        return;
    }

    let server = ScriptedServer::new(vec![response_json(
        429,
        r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#,
    )])
    .await;

    let error = client_for(&server)
        .stream(&hello_request(), None)
        .await
        .expect_err("429 should fail");

    assert_eq!(error.failure_kind(), FailureKind::RateLimited);
    assert_eq!(server.request_count(), 1);

    server.shutdown();
}

#[tokio::test]
async fn stream_integration_auth_failure_is_fatal() {
    if !allow_local_integration() {
        return;
    }

    let server = ScriptedServer::new(vec![response_json(
        400,
        r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#,
    )])
    .await;

    let error = client_for(&server)
        .stream(&hello_request(), None)
        .await
        .expect_err("400 should fail");

    assert_eq!(error.failure_kind(), FailureKind::Fatal);
    assert!(error.to_string().contains("API key not valid."));

    server.shutdown();
}

#[tokio::test]
async fn stream_integration_cancellation_during_stream() {
    if !allow_local_integration() {
        return;
    }

    let server = ScriptedServer::new(vec![ScriptedResponse {
        status: 200,
        content_type: "text/event-stream",
        chunks: vec![
            ResponseChunk {
                delay_ms: 0,
                bytes: sse_frames(&[r#"{"candidates":[{"content":{"parts":[{"text":"partial"}]}}]}"#]),
            },
            ResponseChunk {
                delay_ms: 2_000,
                bytes: sse_frames(&[r#"{"candidates":[{"finishReason":"STOP"}]}"#]),
            },
        ],
    }])
    .await;

    let cancel = Arc::new(AtomicBool::new(false));
    let raiser = Arc::clone(&cancel);
    tokio::spawn(async move {
        sleep(Duration::from_millis(100)).await;
        raiser.store(true, Ordering::Release);
    });

    let client = client_for(&server);
    let request = hello_request();
    let result = timeout(Duration::from_secs(1), client.stream(&request, Some(&cancel)))
        .await
        .expect("cancellation should end the stream promptly");

    assert!(matches!(result, Err(GeminiApiError::Cancelled)));

    server.shutdown();
}

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        429 => "Too Many Requests",
        503 => "Service Unavailable",
        _ => "Error",
    }
}

async fn serve_one(
    mut socket: TcpStream,
    scripts: Arc<Vec<ScriptedResponse>>,
    request_count: Arc<AtomicUsize>,
) {
    if read_request_headers(&mut socket).await.is_err() {
        return;
    }

    let index = request_count.fetch_add(1, Ordering::AcqRel);
    let response = scripts
        .get(index)
        .cloned()
        .unwrap_or_else(|| response_json(500, r#"{"error":{"message":"unexpected request"}}"#));

    let headers = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
        response.status,
        status_reason(response.status),
        response.content_type,
    );
    if socket.write_all(headers.as_bytes()).await.is_err() {
        return;
    }

    for chunk in response.chunks {
        if chunk.delay_ms > 0 {
            sleep(Duration::from_millis(chunk.delay_ms)).await;
        }
        let prefix = format!("{:X}\r\n", chunk.bytes.len());
        if socket.write_all(prefix.as_bytes()).await.is_err() {
            return;
        }
        if socket.write_all(&chunk.bytes).await.is_err() {
            return;
        }
        if socket.write_all(b"\r\n").await.is_err() {
            return;
        }
    }

    let _ = socket.write_all(b"0\r\n\r\n").await;
    let _ = socket.shutdown().await;
}

async fn read_request_headers(socket: &mut TcpStream) -> std::io::Result<()> {
    let mut request = Vec::new();
    let mut buffer = [0_u8; 2048];

    loop {
        let n = socket.read(&mut buffer).await?;
        if n == 0 {
            return Ok(());
        }
        request.extend_from_slice(&buffer[..n]);
        if request.windows(4).any(|window| window == b"\r\n\r\n") {
            return Ok(());
        }
    }
}
