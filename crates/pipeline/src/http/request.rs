//! Minimal HTTP/1.1 request parsing: just enough to read the request line,
//! headers, and a POST body, grounded in `requestParse`/`requestParseHeaders`
//! from `original_source/src/dkvstore.c`. Unlike the reference, parsing
//! borrows slices of the input instead of destructively tokenizing it in
//! place.

/// The request methods this pipeline understands. Anything else is
/// `Unknown` and gets a 501.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Unknown,
}

/// A parsed request. `raw` retains the exact bytes read off the socket so a
/// coordinator can forward them verbatim to the owning store.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub raw: Vec<u8>,
}

impl Request {
    /// Parse `raw` as an HTTP/1.1 message. Never fails: anything that
    /// doesn't look like a request line becomes `Method::Unknown` with an
    /// empty body, leaving the caller to reply 400/501.
    pub fn parse(raw: &[u8]) -> Self {
        let text = String::from_utf8_lossy(raw);
        let (head, body) = match text.find("\r\n\r\n") {
            Some(at) => (&text[..at], text[at + 4..].to_string()),
            None => (text.as_ref(), String::new()),
        };

        let mut lines = head.split("\r\n");
        let request_line = lines.next().unwrap_or("");
        let method = match request_line.split(' ').next() {
            Some("GET") => Method::Get,
            Some("POST") => Method::Post,
            _ => Method::Unknown,
        };

        let headers = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();

        Request {
            method,
            headers,
            body,
            raw: raw.to_vec(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
