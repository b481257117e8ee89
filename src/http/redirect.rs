use super::url::ParsedUrl;
use super::{Error, HttpClient, Request, Response};

/// Outcome of a redirect-following fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Followed {
    pub response: Response,
    pub hops: usize,
    /// Set when the last response is itself a redirect we were not allowed to follow.
    pub limit_hit: bool,
}

pub struct RedirectFollower<'a, C: HttpClient> {
    client: &'a C,
    max_hops: usize,
}

impl<'a, C: HttpClient> RedirectFollower<'a, C> {
    pub fn new(client: &'a C, max_hops: usize) -> Self {
        Self { client, max_hops }
    }

    /// Issues `req`, re-issuing it at each `Location` for up to `max_hops` redirects.
    ///
    /// This makes at most `max_hops + 1` transport calls.
    pub fn fetch(&self, req: Request) -> Result<Followed, Error> {
        let mut req = req;
        let mut hops = 0;
        loop {
            let response = self.client.request(req.clone())?;

            let location = if response.is_redirect() {
                response.headers.get("Location").map(str::to_string)
            } else {
                None
            };
            let Some(location) = location else {
                return Ok(Followed {
                    response,
                    hops,
                    limit_hit: false,
                });
            };

            if hops == self.max_hops {
                log::warn!(
                    "redirect limit of {} reached; returning last response ({})",
                    self.max_hops,
                    response.status
                );
                return Ok(Followed {
                    response,
                    hops,
                    limit_hit: true,
                });
            }

            let next = resolve_location(&req, &location);
            log::info!("{} redirect to {}", response.status, next);
            req = req.retarget(next.host, next.port, next.path);
            hops += 1;
        }
    }
}

/// Where a `Location` value points, relative to the request that produced it.
///
/// Absolute paths stay on the current host and port; scheme-relative values
/// get `http:`; everything else goes through the lenient decomposer.
pub fn resolve_location(current: &Request, location: &str) -> ParsedUrl {
    if location.starts_with("//") {
        return ParsedUrl::parse(&format!("http:{}", location));
    }
    if location.starts_with('/') {
        return ParsedUrl {
            scheme: "http".to_string(),
            host: current.host.clone(),
            port: current.port,
            path: location.to_string(),
        };
    }
    ParsedUrl::parse(location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Headers;
    use std::cell::RefCell;

    /// Replays canned responses and records each target it was asked for.
    struct Scripted {
        responses: RefCell<Vec<Response>>,
        seen: RefCell<Vec<String>>,
    }

    impl Scripted {
        fn new(mut responses: Vec<Response>) -> Self {
            responses.reverse();
            Self {
                responses: RefCell::new(responses),
                seen: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen.borrow().len()
        }
    }

    impl HttpClient for Scripted {
        fn request(&self, req: Request) -> Result<Response, Error> {
            self.seen
                .borrow_mut()
                .push(format!("{}:{}{}", req.host, req.port, req.path));
            Ok(self
                .responses
                .borrow_mut()
                .pop()
                .expect("more requests than scripted responses"))
        }
    }

    fn redirect(status: u16, to: &str) -> Response {
        let headers: Headers = [("Location", to)].into_iter().collect();
        Response::new(status, headers, String::new())
    }

    fn ok(body: &str) -> Response {
        Response::new(200, Headers::new(), body.to_string())
    }

    #[test]
    fn no_redirect_is_one_call() {
        let client = Scripted::new(vec![ok("done")]);
        let out = RedirectFollower::new(&client, 5)
            .fetch(Request::get("a", 80, "/"))
            .unwrap();
        assert_eq!(client.calls(), 1);
        assert_eq!(out.hops, 0);
        assert!(!out.limit_hit);
        assert_eq!(out.response.body, "done");
    }

    #[test]
    fn chain_of_n_makes_n_plus_one_calls() {
        let client = Scripted::new(vec![
            redirect(301, "http://b/one"),
            redirect(302, "http://c:8080/two"),
            redirect(303, "http://d/three"),
            redirect(307, "http://e/four"),
            ok("end"),
        ]);
        let out = RedirectFollower::new(&client, 5)
            .fetch(Request::get("a", 80, "/"))
            .unwrap();
        assert_eq!(client.calls(), 5);
        assert_eq!(out.hops, 4);
        assert!(!out.limit_hit);
        assert_eq!(out.response.body, "end");
        assert_eq!(
            *client.seen.borrow(),
            vec!["a:80/", "b:80/one", "c:8080/two", "d:80/three", "e:80/four"]
        );
    }

    #[test]
    fn chain_of_exactly_max_hops_still_terminates() {
        let client = Scripted::new(vec![
            redirect(301, "http://b/"),
            redirect(301, "http://c/"),
            ok("end"),
        ]);
        let out = RedirectFollower::new(&client, 2)
            .fetch(Request::get("a", 80, "/"))
            .unwrap();
        assert_eq!(client.calls(), 3);
        assert!(!out.limit_hit);
    }

    #[test]
    fn endless_chain_stops_at_limit_with_last_response() {
        let responses = (0..10).map(|i| redirect(302, &format!("http://h{i}/"))).collect();
        let client = Scripted::new(responses);
        let out = RedirectFollower::new(&client, 3)
            .fetch(Request::get("a", 80, "/"))
            .unwrap();
        assert_eq!(client.calls(), 4);
        assert_eq!(out.hops, 3);
        assert!(out.limit_hit);
        assert_eq!(out.response.status, 302);
        assert_eq!(out.response.headers.get("Location"), Some("http://h3/"));
    }

    #[test]
    fn redirect_status_without_location_is_returned() {
        let client = Scripted::new(vec![Response::new(301, Headers::new(), String::new())]);
        let out = RedirectFollower::new(&client, 5)
            .fetch(Request::get("a", 80, "/"))
            .unwrap();
        assert_eq!(client.calls(), 1);
        assert_eq!(out.response.status, 301);
    }

    #[test]
    fn other_3xx_codes_are_not_followed() {
        let client = Scripted::new(vec![redirect(308, "http://b/")]);
        let out = RedirectFollower::new(&client, 5)
            .fetch(Request::get("a", 80, "/"))
            .unwrap();
        assert_eq!(client.calls(), 1);
        assert_eq!(out.response.status, 308);
    }

    #[test]
    fn relative_location_stays_on_current_host() {
        let client = Scripted::new(vec![redirect(301, "/moved?x=1"), ok("here")]);
        RedirectFollower::new(&client, 5)
            .fetch(Request::get("a", 8080, "/old"))
            .unwrap();
        assert_eq!(*client.seen.borrow(), vec!["a:8080/old", "a:8080/moved?x=1"]);
    }

    #[test]
    fn scheme_relative_location_gets_http() {
        let req = Request::get("a", 8080, "/");
        let next = resolve_location(&req, "//other.org/p");
        assert_eq!(next.host, "other.org");
        assert_eq!(next.port, 80);
        assert_eq!(next.path, "/p");
    }
}
