//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves routes registered up front. Each route can set a status, an optional
//! `Content-Disposition`, a redirect, or cut the body short. Counts requests
//! and records `Authorization` headers.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
    /// Send only this many body bytes, then close (Content-Length still advertises the full body).
    pub cut_after: Option<usize>,
    /// Respond 302 to this path instead.
    pub redirect_to: Option<String>,
}

impl Route {
    pub fn file(filename: &str, body: &[u8]) -> Self {
        Self {
            status: 200,
            content_disposition: Some(format!("attachment; filename=\"{}\"", filename)),
            body: body.to_vec(),
            cut_after: None,
            redirect_to: None,
        }
    }

    pub fn anonymous(body: &[u8]) -> Self {
        Self {
            content_disposition: None,
            ..Self::file("", body)
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_disposition: None,
            ..Self::file("", b"error")
        }
    }

    pub fn redirect(to: &str) -> Self {
        Self {
            status: 302,
            content_disposition: None,
            redirect_to: Some(to.to_string()),
            ..Self::file("", b"")
        }
    }
}

#[derive(Clone)]
pub struct ArtifactServer {
    pub base: String,
    requests: Arc<AtomicUsize>,
    auth: Arc<Mutex<Vec<Option<String>>>>,
}

impl ArtifactServer {
    /// Starts the server on an ephemeral port; it lives until the test process exits.
    pub fn start(routes: Vec<(&str, Route)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let routes: Arc<HashMap<String, Route>> = Arc::new(
            routes
                .into_iter()
                .map(|(p, r)| (p.to_string(), r))
                .collect(),
        );
        let requests = Arc::new(AtomicUsize::new(0));
        let auth = Arc::new(Mutex::new(Vec::new()));
        {
            let requests = Arc::clone(&requests);
            let auth = Arc::clone(&auth);
            thread::spawn(move || {
                for stream in listener.incoming().flatten() {
                    let routes = Arc::clone(&routes);
                    let requests = Arc::clone(&requests);
                    let auth = Arc::clone(&auth);
                    thread::spawn(move || handle(stream, &routes, &requests, &auth));
                }
            });
        }
        Self {
            base: format!("http://127.0.0.1:{}", port),
            requests,
            auth,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn authorizations(&self) -> Vec<Option<String>> {
        self.auth.lock().unwrap().clone()
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    routes: &HashMap<String, Route>,
    requests: &AtomicUsize,
    auth: &Mutex<Vec<Option<String>>>,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]).into_owned();
    let (path, authorization) = parse_request(&request);
    requests.fetch_add(1, Ordering::SeqCst);
    auth.lock().unwrap().push(authorization);

    let Some(route) = routes.get(&path) else {
        let _ = stream.write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    };

    let mut head = format!(
        "HTTP/1.1 {} X\r\nContent-Length: {}\r\nConnection: close\r\n",
        route.status,
        route.body.len()
    );
    if let Some(cd) = &route.content_disposition {
        head.push_str(&format!("Content-Disposition: {}\r\n", cd));
    }
    if let Some(to) = &route.redirect_to {
        head.push_str(&format!("Location: {}\r\n", to));
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());

    let send = route.cut_after.unwrap_or(route.body.len()).min(route.body.len());
    let _ = stream.write_all(&route.body[..send]);
    let _ = stream.flush();
}

/// Returns (path, Authorization header value).
fn parse_request(request: &str) -> (String, Option<String>) {
    let mut lines = request.lines();
    let path = lines
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    let mut authorization = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("authorization") {
                authorization = Some(value.trim().to_string());
            }
        }
    }
    (path, authorization)
}
