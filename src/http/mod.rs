pub mod connection;
pub mod headers;
pub mod http1;
pub mod redirect;
pub mod url;

use std::time::Duration;

pub use headers::Headers;

pub trait HttpClient {
    fn request(&self, req: Request) -> Result<Response, Error>;
}

#[derive(Debug, Clone)]
pub struct Request {
    pub host: String,
    pub port: u16,
    pub path: String,
    pub method: String,
    pub accept: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub timeout: Duration,
}

impl Request {
    pub fn new(host: String, port: u16, path: String, method: String) -> Self {
        Self {
            host,
            port,
            path,
            method,
            accept: None,
            headers: Vec::new(),
            body: None,
            timeout: crate::config::DEFAULT_TIMEOUT,
        }
    }

    pub fn get(host: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self::new(host.into(), port, path.into(), "GET".to_string())
    }

    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Same request aimed at another target; method, headers and body carry over.
    pub fn retarget(&self, host: String, port: u16, path: String) -> Self {
        Self {
            host,
            port,
            path,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, headers: Headers, body: String) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("Content-Type")
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self.status, 301 | 302 | 303 | 307)
    }
}

/// Why a byte stream could not be read as an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Malformed {
    #[error("no header/body separator in response")]
    MissingSeparator,

    #[error("unparsable status line: {0:?}")]
    StatusLine(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("connection to {0} failed: {1}")]
    Connect(String, #[source] std::io::Error),

    #[error("timed out talking to {0}")]
    Timeout(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed response: {0}")]
    Malformed(#[from] Malformed),
}
