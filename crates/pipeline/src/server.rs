//! Accept loop, grounded in `serverListen`/`serverAcceptLoop`/
//! `serverHandleAccept` from `original_source/src/dkvstore.c`: the
//! reference spawns one thread per accepted connection to read and parse
//! the request, then hands it to the shared worker queue.
//!
//! The reference loops on a blocking `accept()` forever; nothing in it
//! ever stops the server short of `kill -9`. Rust's `TcpListener` has no
//! portable way to interrupt a blocking `accept()` from another thread, so
//! this uses a non-blocking listener polled against a shared stop flag
//! instead, for graceful shutdown.

use std::io::{ErrorKind, Read};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::http::Request;
use crate::queue::{Job, Sender};

/// How often the accept loop checks the listener for a pending connection
/// while it is otherwise idle.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A chunk size for growing the read buffer while the request is still
/// arriving, mirroring the reference's doubling-buffer strategy without
/// its fixed initial cap.
const READ_CHUNK: usize = 4096;

pub struct Server {
    listener: TcpListener,
    jobs: Sender,
    stop: Arc<AtomicBool>,
}

impl Server {
    /// Bind `addr` and prepare an accept loop that feeds parsed requests
    /// into `jobs`. `stop` is shared with the caller so it can request
    /// shutdown from another thread (e.g. a signal handler).
    pub fn bind(addr: &str, jobs: Sender, stop: Arc<AtomicBool>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        info!(%addr, "listening");
        Ok(Server {
            listener,
            jobs,
            stop,
        })
    }

    /// Run the accept loop until `stop` is set. Each accepted connection
    /// is handed a dedicated thread that reads and parses the request and
    /// enqueues it; the accept loop itself never blocks on client I/O.
    pub fn run(&self) {
        while !self.stop.load(Ordering::Relaxed) {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    debug!(%peer, "accepted connection");
                    let jobs = self.jobs.clone();
                    thread::spawn(move || handle_connection(stream, jobs));
                }
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(POLL_INTERVAL);
                }
                Err(err) => {
                    warn!(error = %err, "accept failed");
                    thread::sleep(POLL_INTERVAL);
                }
            }
        }
        info!("accept loop stopped");
    }
}

/// Read one full HTTP request off `stream`, parse it, and push it onto
/// the job queue. Runs on its own thread per connection, the way
/// `serverHandleAccept` spawns a handler thread per client.
fn handle_connection(mut stream: TcpStream, jobs: Sender) {
    let raw = match read_request(&mut stream) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(error = %err, "failed reading request");
            return;
        }
    };

    let request = Request::parse(&raw);
    if jobs.send(Job { stream, request }).is_err() {
        error!("worker queue closed, dropping connection");
    }
}

/// Read until the header/body boundary, then, if a `Content-Length`
/// header is present, keep reading until the whole body has arrived.
fn read_request(stream: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    let header_end = loop {
        if let Some(at) = find_header_end(&buf) {
            break at;
        }
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            return Ok(buf);
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let content_length = content_length_of(&buf[..header_end]);
    let body_start = header_end + 4;
    while buf.len() < body_start + content_length {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Ok(buf)
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn content_length_of(head: &[u8]) -> usize {
    let head = String::from_utf8_lossy(head);
    head.split("\r\n")
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_header_boundary() {
        let buf = b"GET / HTTP/1.1\r\nHost: x\r\n\r\nbody";
        assert_eq!(find_header_end(buf), Some(25));
    }

    #[test]
    fn missing_boundary_is_none() {
        assert_eq!(find_header_end(b"GET / HTTP/1.1\r\n"), None);
    }

    #[test]
    fn reads_content_length_case_insensitively() {
        let head = b"POST / HTTP/1.1\r\ncontent-LENGTH: 12\r\n";
        assert_eq!(content_length_of(head), 12);
    }

    #[test]
    fn missing_content_length_is_zero() {
        let head = b"GET / HTTP/1.1\r\nHost: x\r\n";
        assert_eq!(content_length_of(head), 0);
    }
}
