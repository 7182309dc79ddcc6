//! Loopback HTTP server that replays scripted festivals API responses

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

pub const FIXTURE: &str = include_str!("../fixtures/festivals.json");
pub const EXPECTED_OUTPUT: &str = include_str!("../fixtures/expected_output.txt");

/// Serves one scripted response per connection, repeating the last one
pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<AtomicUsize>,
    heads: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub fn start(script: Vec<(u16, &str)>) -> Self {
        assert!(!script.is_empty(), "Stub server needs at least one response");
        let script: Vec<(u16, String)> = script
            .into_iter()
            .map(|(status, body)| (status, body.to_string()))
            .collect();

        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind stub server");
        let addr = listener.local_addr().expect("Stub server has no address");
        let requests = Arc::new(AtomicUsize::new(0));
        let heads = Arc::new(Mutex::new(Vec::new()));

        let counter = Arc::clone(&requests);
        let seen = Arc::clone(&heads);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let head = read_request_head(&mut stream);
                seen.lock().unwrap().push(head);

                let index = counter.fetch_add(1, Ordering::SeqCst);
                let (status, body) = &script[index.min(script.len() - 1)];
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason(*status),
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });

        Self {
            addr,
            requests,
            heads,
        }
    }

    /// Base URI to configure the client with
    pub fn base_uri(&self) -> String {
        format!("http://{}/api/v1/", self.addr)
    }

    /// Number of requests answered so far
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Raw request heads in arrival order
    pub fn request_heads(&self) -> Vec<String> {
        self.heads.lock().unwrap().clone()
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Reads up to the blank line ending the request head
fn read_request_head(stream: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}
