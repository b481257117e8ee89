use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use crate::config::{self, Config};
use crate::fetcher::{Fetched, Fetcher};
use crate::search::SearchResult;

/// Command line program for HTTP requests
#[derive(Parser, Debug)]
#[command(name = "go2web", version)]
#[command(about = "Fetch a URL or search the web over plain HTTP/1.1")]
#[command(after_help = "use the -h anytime you need some help")]
pub struct Cli {
    /// URL to fetch
    #[arg(short, long)]
    pub url: Option<String>,

    /// Term to search for
    #[arg(short, long, num_args = 1..)]
    pub search_term: Option<Vec<String>>,

    /// Accept header sent with every request
    #[arg(short, long, default_value = config::DEFAULT_ACCEPT)]
    pub accept: String,

    /// Number of search results to show
    #[arg(short = 'n', long, default_value_t = config::DEFAULT_RESULT_COUNT)]
    pub results: usize,

    /// Redirects to follow before giving up
    #[arg(long, default_value_t = config::MAX_REDIRECTS)]
    pub max_redirects: usize,

    /// Socket deadline per request, in seconds
    #[arg(
        long,
        default_value_t = config::DEFAULT_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// Cache file location
    #[arg(long, env = "GO2WEB_CACHE", default_value = config::CACHE_FILE)]
    pub cache_file: PathBuf,

    /// Keep the cache in memory only
    #[arg(long)]
    pub no_cache: bool,

    /// Log wire activity to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn config(&self) -> Config {
        Config {
            accept: self.accept.clone(),
            cache_path: (!self.no_cache).then(|| self.cache_file.clone()),
            timeout: Duration::from_secs(self.timeout),
            max_redirects: self.max_redirects,
            result_count: self.results,
        }
    }

    pub fn phrase(&self) -> Option<String> {
        self.search_term.as_ref().map(|words| words.join(" "))
    }
}

pub fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let phrase = cli.phrase();
    if cli.url.is_none() && phrase.is_none() {
        write!(out, "{}", Cli::command().render_help())?;
        return Ok(());
    }

    let mut fetcher = Fetcher::new(cli.config());

    if let Some(url) = &cli.url {
        let fetched = fetcher.fetch(url)?;
        report(&fetched);
        writeln!(out, "{}", fetched.content().render())?;
    }

    if let Some(phrase) = &phrase {
        let results = fetcher
            .search(phrase)
            .with_context(|| format!("search for {:?} failed", phrase))?;
        out.write_all(format_results(&results).as_bytes())?;
    }

    out.flush()?;
    Ok(())
}

fn report(fetched: &Fetched) {
    if fetched.redirect_limit_hit {
        eprintln!(
            "warning: redirect limit reached, showing last response ({})",
            fetched.response.status
        );
    }
    if !(200..400).contains(&fetched.response.status) {
        eprintln!("HTTP {}", fetched.response.status);
    }
}

pub fn format_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No results found.\n".to_string();
    }
    let mut text = String::new();
    for (i, r) in results.iter().enumerate() {
        text.push_str(&format!("{}. {}\n   {}\n", i + 1, r.title, r.link));
        if !r.snippet.is_empty() {
            text.push_str(&format!("   {}\n", r.snippet));
        }
        text.push('\n');
    }
    text
}
