//! Request-line validation and cookie extraction.
//!
//! Grounded in `producerHandleAccept`/`httpGetForwardCookie` from
//! `original_source/src/loadbalancer.c`: the reference `regcomp`s both
//! patterns on every call, which we avoid by compiling each once behind
//! a `OnceLock`.

use std::sync::OnceLock;

use regex::Regex;

fn get_request_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^GET /[^ ]* HTTP/1").unwrap())
}

fn cookie_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"forwarderid=([^;]+)").unwrap())
}

/// `true` if `request` looks like a GET request line, the only method
/// the load balancer accepts, matching `producerHandleAccept`'s
/// `^GET /([^ ]*) HTTP/1` check.
pub fn is_get_request(request: &str) -> bool {
    get_request_line_re().is_match(request)
}

/// Extract the `forwarderid=<n>` cookie value as an index, if present and
/// numeric. Mirrors `httpGetForwardCookie`, which returns `-1` on any
/// failure to parse; we fold that into `None`.
pub fn forwarder_cookie(request: &str) -> Option<usize> {
    let caps = cookie_re().captures(request)?;
    caps.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_get_request_line() {
        assert!(is_get_request("GET /foo HTTP/1.1\r\nHost: x\r\n\r\n"));
    }

    #[test]
    fn rejects_non_get_methods() {
        assert!(!is_get_request("POST /foo HTTP/1.1\r\n\r\n"));
    }

    #[test]
    fn extracts_cookie_value() {
        let req = "GET / HTTP/1.1\r\nCookie: forwarderid=2; other=x\r\n\r\n";
        assert_eq!(forwarder_cookie(req), Some(2));
    }

    #[test]
    fn missing_cookie_is_none() {
        let req = "GET / HTTP/1.1\r\nHost: x\r\n\r\n";
        assert_eq!(forwarder_cookie(req), None);
    }

    #[test]
    fn non_numeric_cookie_is_none() {
        let req = "GET / HTTP/1.1\r\nCookie: forwarderid=nope; \r\n\r\n";
        assert_eq!(forwarder_cookie(req), None);
    }
}
