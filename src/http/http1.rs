use std::borrow::Cow;

use super::connection::Connection;
use super::{Error, Headers, HttpClient, Malformed, Request, Response};

const SEPARATOR: &[u8] = b"\r\n\r\n";

/// HTTP/1.1 over plaintext TCP, one connection per request.
#[derive(Debug, Default, Clone, Copy)]
pub struct Http1Client;

impl Http1Client {
    pub fn new() -> Self {
        Self
    }
}

impl HttpClient for Http1Client {
    fn request(&self, req: Request) -> Result<Response, Error> {
        log::debug!("{} {}:{}{}", req.method, req.host, req.port, req.path);
        let mut conn = Connection::open(&req.host, req.port, req.timeout)?;
        conn.send(&encode_request(&req))?;
        let raw = conn.read_to_close()?;
        drop(conn);

        let response = parse_response(&raw)?;
        log::debug!("{}:{} answered {}", req.host, req.port, response.status);
        Ok(response)
    }
}

pub fn encode_request(req: &Request) -> Vec<u8> {
    let mut head = format!("{} {} HTTP/1.1\r\n", req.method, req.path);
    head.push_str(&format!("Host: {}\r\n", req.host));
    head.push_str("Connection: close\r\n");
    if let Some(accept) = &req.accept {
        head.push_str(&format!("Accept: {}\r\n", accept));
    }
    for (k, v) in &req.headers {
        head.push_str(&format!("{}: {}\r\n", k, v));
    }

    let mut out = head.into_bytes();
    match &req.body {
        Some(body) => {
            out.extend_from_slice(format!("Content-Length: {}\r\n\r\n", body.len()).as_bytes());
            out.extend_from_slice(body);
        }
        None => out.extend_from_slice(b"\r\n"),
    }
    out
}

pub fn parse_response(raw: &[u8]) -> Result<Response, Malformed> {
    let split = raw
        .windows(SEPARATOR.len())
        .position(|w| w == SEPARATOR)
        .ok_or(Malformed::MissingSeparator)?;
    let head = String::from_utf8_lossy(&raw[..split]);
    let body = decode_text(&raw[split + SEPARATOR.len()..], "body");

    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap_or_default();
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| Malformed::StatusLine(status_line.to_string()))?;

    let mut headers = Headers::new();
    for line in lines {
        if let Some((name, value)) = line.split_once(": ") {
            headers.insert(name, value);
        }
    }

    Ok(Response::new(status, headers, body))
}

fn decode_text(bytes: &[u8], what: &str) -> String {
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(text) => text.to_string(),
        Cow::Owned(text) => {
            log::warn!("response {} is not valid UTF-8; invalid bytes replaced", what);
            text
        }
    }
}
