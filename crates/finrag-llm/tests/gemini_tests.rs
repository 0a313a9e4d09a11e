use std::sync::{Arc, Mutex};

use finrag_core::config::LlmSettings;
use finrag_core::traits::TextGenerator;
use finrag_llm::{GeminiClient, LlmError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serves one canned HTTP response and records the raw request it received.
async fn serve_once(status: &'static str, body: &'static str) -> (String, Arc<Mutex<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(String::new()));
    let seen_w = Arc::clone(&seen);
    tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut tmp = [0u8; 4096];
        loop {
            let n = sock.read(&mut tmp).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&tmp[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .find_map(|l| l.to_ascii_lowercase().strip_prefix("content-length:").map(|v| v.trim().parse::<usize>().unwrap_or(0)))
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + content_length {
                    break;
                }
            }
        }
        *seen_w.lock().unwrap() = String::from_utf8_lossy(&buf).to_string();
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        sock.write_all(response.as_bytes()).await.unwrap();
        sock.shutdown().await.ok();
    });
    (format!("http://{addr}"), seen)
}

fn settings(base_url: &str, api_key: Option<&str>) -> LlmSettings {
    LlmSettings {
        model: "gemini-2.5-flash".to_string(),
        base_url: base_url.to_string(),
        timeout_secs: 5,
        api_key: api_key.map(str::to_string),
    }
}

#[tokio::test]
async fn generate_posts_prompt_and_returns_text() {
    let (url, seen) = serve_once("200 OK", r#"{"candidates":[{"content":{"parts":[{"text":"Use the e-filing portal."}]}}]}"#).await;
    let client = GeminiClient::new(&settings(&url, Some("test-key"))).unwrap();

    let answer = client.generate("How to file ITR?").await.expect("answer");
    assert_eq!(answer, "Use the e-filing portal.");

    let raw = seen.lock().unwrap().clone();
    assert!(raw.starts_with("POST /v1beta/models/gemini-2.5-flash:generateContent"));
    assert!(raw.to_ascii_lowercase().contains("x-goog-api-key: test-key"));
    assert!(raw.contains(r#""text":"How to file ITR?""#));
}

#[tokio::test]
async fn api_error_message_is_surfaced() {
    let (url, _) = serve_once("429 Too Many Requests", r#"{"error":{"code":429,"message":"Resource exhausted","status":"RESOURCE_EXHAUSTED"}}"#).await;
    let client = GeminiClient::new(&settings(&url, Some("k"))).unwrap();
    match client.generate_content("hi").await {
        Err(LlmError::Api { status, message, .. }) => {
            assert_eq!(status, 429);
            assert_eq!(message, "Resource exhausted");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn empty_candidates_are_an_error() {
    let (url, _) = serve_once("200 OK", r#"{"candidates":[]}"#).await;
    let client = GeminiClient::new(&settings(&url, Some("k"))).unwrap();
    assert!(matches!(client.generate_content("hi").await, Err(LlmError::EmptyResponse { .. })));
}

#[tokio::test]
async fn missing_key_fails_only_when_called() {
    let client = GeminiClient::new(&settings("http://127.0.0.1:9", None)).expect("constructs without a key");
    assert_eq!(client.model(), "gemini-2.5-flash");
    assert!(matches!(client.generate_content("hi").await, Err(LlmError::MissingApiKey)));
    let blank = GeminiClient::new(&settings("http://127.0.0.1:9", Some("  "))).unwrap();
    assert!(matches!(blank.generate_content("hi").await, Err(LlmError::MissingApiKey)));
}
