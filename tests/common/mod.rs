use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Minimal expense API: answers each request with the next scripted status
/// (200 once the script runs out) and records JSON bodies.
#[derive(Clone)]
pub struct StubApi {
    pub addr: SocketAddr,
    statuses: Arc<Mutex<VecDeque<u16>>>,
    bodies: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl StubApi {
    pub async fn start(statuses: &[u16]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let stub = Self {
            addr: listener.local_addr().unwrap(),
            statuses: Arc::new(Mutex::new(statuses.iter().copied().collect())),
            bodies: Arc::new(Mutex::new(Vec::new())),
        };

        let server = stub.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let server = server.clone();
                tokio::spawn(async move { server.handle(stream).await });
            }
        });

        stub
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn bodies(&self) -> Vec<serde_json::Value> {
        self.bodies.lock().unwrap().clone()
    }

    async fn handle(&self, mut stream: TcpStream) {
        let Some(body) = read_body(&mut stream).await else {
            // connectivity probes connect and hang up
            return;
        };

        let status = self.statuses.lock().unwrap().pop_front().unwrap_or(200);
        if let Ok(json) = serde_json::from_str(&body) {
            self.bodies.lock().unwrap().push(json);
        }

        let response =
            format!("HTTP/1.1 {status} Stub\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
        let _ = stream.write_all(response.as_bytes()).await;
    }
}

async fn read_body(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
        let body_len = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= end + 4 + body_len {
            return Some(String::from_utf8_lossy(&buf[end + 4..end + 4 + body_len]).into_owned());
        }
    }
}
