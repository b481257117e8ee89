//! `go2web`: a plain-HTTP/1.1 fetcher built directly on TCP sockets.
//!
//! A URL is decomposed, requested with a hand-framed HTTP/1.1 request,
//! redirects are followed up to a hop limit, and the final response is cached
//! for a minute under the URL the caller asked for. Bodies are rendered as
//! pretty JSON or as the visible text of an HTML page. Search mode scrapes a
//! lite results page into title/link/snippet records.
pub mod cache;
pub mod cli;
pub mod config;
pub mod content;
pub mod fetcher;
pub mod http;
pub mod search;
