//! Reply rendering, grounded in `sendHTTPCode` from
//! `original_source/src/dkvstore.c`.

/// Status codes this pipeline ever replies with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
    NotFound,
    InternalServerError,
    NotImplemented,
}

impl Status {
    fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::InternalServerError => 500,
            Status::NotImplemented => 501,
        }
    }

    fn reason(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::BadRequest => "Bad Request",
            Status::NotFound => "Not Found",
            Status::InternalServerError => "Internal Server Error",
            Status::NotImplemented => "Not Implemented",
        }
    }
}

/// An outgoing reply.
///
/// Most responses are rendered from a [`Status`] and a short plaintext
/// body (see [`Response::status`]/[`Response::with_body`]). A coordinator
/// forwarding a request to a STORE is different: it must relay the
/// store's reply bytes to the client completely unchanged (Testable
/// Property 7, "forward-transparency") rather than re-render them through
/// this type's own status-line format. [`Response::raw`] carries such a
/// reply through untouched.
#[derive(Debug, Clone)]
pub struct Response {
    status: Status,
    body: Body,
}

#[derive(Debug, Clone)]
enum Body {
    Text(String),
    /// Bytes to write to the client verbatim, already a complete HTTP
    /// message (status-line, headers, body) built by an upstream STORE.
    Raw(Vec<u8>),
}

impl Response {
    pub fn status(status: Status) -> Self {
        let body = format!("HTTP {} {}", status.code(), status.reason());
        Self {
            status,
            body: Body::Text(body),
        }
    }

    pub fn with_body(status: Status, body: impl Into<String>) -> Self {
        Self {
            status,
            body: Body::Text(body.into()),
        }
    }

    /// A reply relayed verbatim from an upstream STORE. `status_code`
    /// is not meaningful for raw responses; the real status lives in
    /// `bytes`' own status line.
    pub fn raw(bytes: Vec<u8>) -> Self {
        Self {
            status: Status::Ok,
            body: Body::Raw(bytes),
        }
    }

    /// The status this response was constructed with. For [`Self::raw`]
    /// responses this is a placeholder, not the upstream's actual code.
    pub fn status_code(&self) -> u16 {
        self.status.code()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match &self.body {
            Body::Raw(bytes) => bytes.clone(),
            Body::Text(body) => format!(
                "HTTP/1.1 {} {}\r\n\
                 Content-Type: text/plain\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\
                 \r\n\
                 {}",
                self.status.code(),
                self.status.reason(),
                body.len(),
                body,
            )
            .into_bytes(),
        }
    }
}
