use std::fmt;

use crate::config::{DEFAULT_PATH, DEFAULT_PORT};

/// A URL split into the pieces the transport needs.
///
/// Decomposition never fails: whatever the input, some `ParsedUrl` comes
/// out, and a nonsensical host surfaces later as a connection error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl ParsedUrl {
    pub fn parse(input: &str) -> Self {
        let (scheme, rest) = match input.split_once("://") {
            Some((scheme, rest)) => (scheme.to_string(), rest),
            None => ("http".to_string(), input),
        };

        let (authority, path) = match rest.find('/') {
            Some(i) => (&rest[..i], rest[i..].to_string()),
            None => (rest, DEFAULT_PATH.to_string()),
        };

        // A port that is not a number stays glued to the host, which then
        // fails to resolve instead of failing here.
        let (host, port) = match authority.split_once(':') {
            Some((host, port)) => match port.parse::<u16>() {
                Ok(port) => (host.to_string(), port),
                Err(_) => (authority.to_string(), DEFAULT_PORT),
            },
            None => (authority.to_string(), DEFAULT_PORT),
        };

        Self {
            scheme,
            host,
            port,
            path,
        }
    }
}

impl fmt::Display for ParsedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}{}", self.scheme, self.host, self.port, self.path)
    }
}
