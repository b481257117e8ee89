use crate::cache::ResponseCache;
use crate::config::{Config, USER_AGENT};
use crate::content::{self, Content};
use crate::http::http1::Http1Client;
use crate::http::redirect::RedirectFollower;
use crate::http::url::ParsedUrl;
use crate::http::{self, HttpClient, Request, Response};
use crate::search::{self, SearchResult};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to get a valid response from {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: http::Error,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub response: Response,
    pub from_cache: bool,
    pub hops: usize,
    pub redirect_limit_hit: bool,
}

impl Fetched {
    pub fn content(&self) -> Content {
        content::process(
            &self.response.body,
            self.response.content_type().unwrap_or_default(),
        )
    }
}

/// Cache-first fetch pipeline. A lookup is either a fresh cache hit or one
/// redirect-following network fetch whose final response is written back under
/// the URL the caller asked for.
pub struct Fetcher<C: HttpClient = Http1Client> {
    client: C,
    cache: ResponseCache,
    config: Config,
}

impl Fetcher<Http1Client> {
    pub fn new(config: Config) -> Self {
        let cache = match &config.cache_path {
            Some(path) => ResponseCache::open(path),
            None => ResponseCache::in_memory(),
        };
        Self::with_client(Http1Client::new(), cache, config)
    }
}

impl<C: HttpClient> Fetcher<C> {
    pub fn with_client(client: C, cache: ResponseCache, config: Config) -> Self {
        Self {
            client,
            cache,
            config,
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fetch(&mut self, url: &str) -> Result<Fetched, FetchError> {
        if let Some(entry) = self.cache.get(url) {
            log::info!("cache hit for {}", url);
            return Ok(Fetched {
                response: entry.to_response(),
                from_cache: true,
                hops: 0,
                redirect_limit_hit: false,
            });
        }

        let target = ParsedUrl::parse(url);
        if target.scheme != "http" {
            log::warn!(
                "scheme {:?} is not supported; trying plaintext HTTP on port {}",
                target.scheme,
                target.port
            );
        }

        let req = Request::get(target.host, target.port, target.path)
            .accept(self.config.accept.as_str())
            .header("User-Agent", USER_AGENT)
            .timeout(self.config.timeout);
        let followed = RedirectFollower::new(&self.client, self.config.max_redirects)
            .fetch(req)
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let response = followed.response;
        if let Err(e) = self.cache.put(
            url,
            response.status,
            response.headers.clone(),
            response.body.clone(),
        ) {
            log::warn!("response for {} not cached: {}", url, e);
        }

        Ok(Fetched {
            response,
            from_cache: false,
            hops: followed.hops,
            redirect_limit_hit: followed.limit_hit,
        })
    }

    pub fn search(&mut self, phrase: &str) -> Result<Vec<SearchResult>, FetchError> {
        let url = search::search_url(phrase);
        let fetched = self.fetch(&url)?;
        if !(200..300).contains(&fetched.response.status) {
            log::warn!("search page answered {}", fetched.response.status);
        }
        Ok(search::extract(
            &fetched.response.body,
            self.config.result_count,
        ))
    }
}
