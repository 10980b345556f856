#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// One canned HTTP response in a scripted sequence.
#[derive(Debug, Clone)]
pub struct ScriptedResponse {
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
}

impl ScriptedResponse {
    pub fn ok(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
            delay: None,
        }
    }

    pub fn slow(body: &str, delay: Duration) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            delay: Some(delay),
        }
    }
}

#[derive(Default)]
struct ServerState {
    // Per-path request counters; the response script advances with them and
    // repeats its last entry once exhausted.
    hits: Mutex<HashMap<String, usize>>,
    total_hits: AtomicUsize,
    last_user_agent: Mutex<Option<String>>,
}

/// Minimal scripted HTTP server for integration tests. Routes are keyed by
/// path (query string ignored); unknown paths get a 404.
pub struct TestServer {
    addr: std::net::SocketAddr,
    state: Arc<ServerState>,
}

impl TestServer {
    pub async fn start(routes: HashMap<String, Vec<ScriptedResponse>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(ServerState::default());
        let routes = Arc::new(routes);

        let accept_state = state.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let state = accept_state.clone();
                let routes = routes.clone();
                tokio::spawn(async move {
                    handle_connection(stream, state, routes).await;
                });
            }
        });

        Self { addr, state }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn hits(&self, path: &str) -> usize {
        *self.state.hits.lock().unwrap().get(path).unwrap_or(&0)
    }

    pub fn total_hits(&self) -> usize {
        self.state.total_hits.load(Ordering::SeqCst)
    }

    pub fn last_user_agent(&self) -> Option<String> {
        self.state.last_user_agent.lock().unwrap().clone()
    }
}

async fn handle_connection(
    mut stream: tokio::net::TcpStream,
    state: Arc<ServerState>,
    routes: Arc<HashMap<String, Vec<ScriptedResponse>>>,
) {
    // Read the request head; GET requests carry no body.
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match stream.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            Err(_) => return,
        }
    }

    let head = String::from_utf8_lossy(&buf);
    let Some(request_line) = head.lines().next() else {
        return;
    };
    let path_with_query = request_line.split_whitespace().nth(1).unwrap_or("/");
    let path = path_with_query
        .split('?')
        .next()
        .unwrap_or(path_with_query)
        .to_string();

    for line in head.lines() {
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("user-agent") {
                *state.last_user_agent.lock().unwrap() = Some(value.trim().to_string());
            }
        }
    }

    state.total_hits.fetch_add(1, Ordering::SeqCst);
    let hit_index = {
        let mut hits = state.hits.lock().unwrap();
        let counter = hits.entry(path.clone()).or_insert(0);
        let index = *counter;
        *counter += 1;
        index
    };

    let response = match routes.get(&path) {
        Some(script) if !script.is_empty() => {
            script[hit_index.min(script.len() - 1)].clone()
        }
        _ => ScriptedResponse::status(404),
    };

    if let Some(delay) = response.delay {
        tokio::time::sleep(delay).await;
    }

    let reason = match response.status {
        200 => "OK",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Response",
    };
    let content_type = if response.body.trim_start().starts_with(['{', '[']) {
        "application/json"
    } else {
        "application/rss+xml"
    };
    let reply = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        reason,
        content_type,
        response.body.len(),
        response.body
    );
    let _ = stream.write_all(reply.as_bytes()).await;
    let _ = stream.shutdown().await;
}
