use std::path::PathBuf;
use std::time::Duration;

// Wire
pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_PATH: &str = "/";
pub const DEFAULT_ACCEPT: &str = "text/html,application/json;q=0.9";
pub const USER_AGENT: &str = concat!("go2web/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const MAX_REDIRECTS: usize = 5;

// Cache
pub const CACHE_FILE: &str = ".go2web_cache.json";
pub const CACHE_TTL: Duration = Duration::from_secs(60);

// Search
pub const SEARCH_URL: &str = "http://lite.duckduckgo.com/lite/?q=";
pub const REDIRECT_WRAPPER: &str = "//duckduckgo.com/l/?uddg=";
pub const DEFAULT_RESULT_COUNT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub accept: String,
    /// `None` keeps the cache in memory only.
    pub cache_path: Option<PathBuf>,
    pub timeout: Duration,
    pub max_redirects: usize,
    pub result_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            accept: DEFAULT_ACCEPT.to_string(),
            cache_path: Some(PathBuf::from(CACHE_FILE)),
            timeout: DEFAULT_TIMEOUT,
            max_redirects: MAX_REDIRECTS,
            result_count: DEFAULT_RESULT_COUNT,
        }
    }
}
