use proxycheck::ProbeError;
use proxycheck::config::Settings;
use proxycheck::http::{BaseUrl, ChatMessage, ChatRequest, ProxyClient, collect_fragments};
use serde_json::json;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(uri: &str) -> ProxyClient {
    let settings = Settings {
        base_url: BaseUrl::parse(uri).unwrap(),
        ..Settings::default()
    };
    ProxyClient::new(&settings).unwrap()
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1700000000,
        "model": "gemini-2.5-pro",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 5, "completion_tokens": 7, "total_tokens": 12}
    })
}

fn sse_body(fragments: &[&str]) -> String {
    let mut body = String::new();
    body.push_str(&format!(
        "data: {}\n\n",
        json!({"choices": [{"index": 0, "delta": {"role": "assistant", "content": ""}}]})
    ));
    for fragment in fragments {
        body.push_str(&format!(
            "data: {}\n\n",
            json!({"choices": [{"index": 0, "delta": {"content": fragment}}]})
        ));
    }
    body.push_str(&format!(
        "data: {}\n\n",
        json!({"choices": [{"index": 0, "delta": {}, "finish_reason": "stop"}]})
    ));
    body.push_str("data: [DONE]\n\n");
    body
}

#[tokio::test]
async fn test_health_ok() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "service": "gemini-proxy-vertex"
        })))
        .mount(&mock_server)
        .await;

    let health = client_for(&mock_server.uri()).health().await.unwrap();
    assert_eq!(health.status, 200);
    assert_eq!(health.body["status"], json!("healthy"));
}

#[tokio::test]
async fn test_health_server_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503).set_body_string("starting"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server.uri()).health().await.unwrap_err();
    match err {
        ProbeError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "starting");
        }
        other => panic!("Expected Status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_health_requires_json() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server.uri()).health().await.unwrap_err();
    assert!(matches!(err, ProbeError::Json(_)));
}

#[tokio::test]
async fn test_health_unreachable() {
    // 端口 1 上没有服务，连接被拒绝
    let err = client_for("http://127.0.0.1:1").health().await.unwrap_err();
    assert!(matches!(err, ProbeError::Http(_)));
}

#[tokio::test]
async fn test_chat_sends_bearer_and_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer not-needed"))
        .and(body_partial_json(json!({
            "model": "gemini-2.5-pro",
            "temperature": 0.5,
            "messages": [{"role": "user", "content": "你好"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("你好！")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri());
    let request = ChatRequest::new(client.model(), vec![ChatMessage::user("你好")])
        .with_temperature(0.5);
    let completion = client.chat(&request).await.unwrap();

    assert_eq!(completion.first_content(), Some("你好！"));
    assert_eq!(completion.usage.unwrap().total_tokens, 12);
}

#[tokio::test]
async fn test_chat_without_api_key() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .mount(&mock_server)
        .await;

    let settings = Settings {
        base_url: BaseUrl::parse(&mock_server.uri()).unwrap(),
        api_key: None,
        ..Settings::default()
    };
    let client = ProxyClient::new(&settings).unwrap();
    client
        .chat(&ChatRequest::new("m", vec![ChatMessage::user("hi")]))
        .await
        .unwrap();

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(!received[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_chat_error_keeps_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "quota exceeded"})),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri());
    let err = client
        .chat(&ChatRequest::new("m", vec![ChatMessage::user("hi")]))
        .await
        .unwrap_err();

    match err {
        ProbeError::Status { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("quota exceeded"));
        }
        other => panic!("Expected Status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_chat_stream_accumulates_fragments() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(sse_body(&["def fib(n):", "\n    ", "return n"]), "text/event-stream"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri());
    // 请求本身没有设置 stream，客户端负责打开
    let request = ChatRequest::new("m", vec![ChatMessage::user("fib")]);
    let stream = client.chat_stream(&request).await.unwrap();

    let mut count = 0;
    let full = collect_fragments(stream, |_| count += 1).await.unwrap();
    assert_eq!(full, "def fib(n):\n    return n");
    assert_eq!(count, 3);
}

#[tokio::test]
async fn test_chat_stream_error_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such route"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri());
    let result = client
        .chat_stream(&ChatRequest::new("m", vec![ChatMessage::user("hi")]))
        .await;
    assert!(matches!(result, Err(ProbeError::Status { status: 404, .. })));
}

#[tokio::test]
async fn test_base_url_with_path_prefix() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/proxy/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "healthy"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&format!("{}/proxy/", mock_server.uri()));
    client.health().await.unwrap();
}

/// 读完一个带 Content-Length 的 HTTP 请求
async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                return;
            }
        }
    }
}

#[tokio::test]
async fn test_slow_stream_outlives_request_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // 每 600ms 发一个片段，总耗时超过 1s 的超时设置，但每次间隔都小于它
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\n",
            )
            .await
            .unwrap();
        for fragment in ["one ", "two ", "three"] {
            tokio::time::sleep(Duration::from_millis(600)).await;
            let line = format!(
                "data: {}\n\n",
                json!({"choices": [{"index": 0, "delta": {"content": fragment}}]})
            );
            socket.write_all(line.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();
        }
        socket.write_all(b"data: [DONE]\n\n").await.unwrap();
        socket.shutdown().await.unwrap();
    });

    let settings = Settings {
        base_url: BaseUrl::parse(&format!("http://{}", addr)).unwrap(),
        timeout: Duration::from_secs(1),
        ..Settings::default()
    };
    let client = ProxyClient::new(&settings).unwrap();
    let stream = client
        .chat_stream(&ChatRequest::new("m", vec![ChatMessage::user("count")]))
        .await
        .unwrap();

    let full = collect_fragments(stream, |_| {}).await.unwrap();
    assert_eq!(full, "one two three");
}

#[tokio::test]
async fn test_non_streaming_chat_keeps_total_timeout() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_body("late"))
                .set_delay(Duration::from_millis(1500)),
        )
        .mount(&mock_server)
        .await;

    let settings = Settings {
        base_url: BaseUrl::parse(&mock_server.uri()).unwrap(),
        timeout: Duration::from_secs(1),
        ..Settings::default()
    };
    let client = ProxyClient::new(&settings).unwrap();
    let err = client
        .chat(&ChatRequest::new("m", vec![ChatMessage::user("hi")]))
        .await
        .unwrap_err();

    assert!(matches!(err, ProbeError::Http(ref e) if e.is_timeout()));
}
