//! Per-request forwarding: open a connection to the chosen backend, send
//! the client's request verbatim, and relay the backend's response back
//! to the client until it closes the connection.
//!
//! Grounded in `buffered_sr`/`consumerForwardSingleRequest` from
//! `original_source/src/loadbalancer.c`. The reference passes
//! `MSG_NOSIGNAL` to `send()` so a client that has already hung up
//! doesn't raise `SIGPIPE` and kill the whole process; `TcpStream`
//! writes never raise `SIGPIPE` in the first place; a broken pipe
//! surfaces as an ordinary `io::Error` we can match on, so no explicit
//! suppression is needed, and a failed relay write just ends the loop
//! early the same way the reference's `sent <= -1` check does.

use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;

use tracing::{debug, warn};

const RELAY_BUFFER_SIZE: usize = 4096 * 8;

/// `HTTP/1.1 500 Internal Server Error` reply, sent when a backend can't
/// be reached at all, mirroring `sendHTTPError500`.
const ERROR_500: &[u8] = b"HTTP/1.1 500 Internal Server Error\r\n\
Content-Type: text/plain\r\n\
\r\n\
500 Internal Server Error";

/// Reply 500 to a connection that never makes it as far as picking a
/// backend (bad request line, no backend available). Matches
/// `sendHTTPError500`'s reply-then-close behavior.
pub fn reject(client: &mut TcpStream) {
    let _ = client.write_all(ERROR_500);
}

/// Connect to `backend`, send `request`, and relay the reply back to
/// `client` until the backend closes its end. Returns the number of
/// bytes relayed to the client.
pub fn forward(client: &mut TcpStream, backend_ip: &str, backend_port: u16, request: &[u8]) -> usize {
    let mut backend = match TcpStream::connect((backend_ip, backend_port)) {
        Ok(stream) => stream,
        Err(err) => {
            warn!(backend_ip, backend_port, error = %err, "failed to connect to backend");
            let _ = client.write_all(ERROR_500);
            return 0;
        }
    };

    if let Err(err) = backend.write_all(request) {
        warn!(backend_ip, backend_port, error = %err, "failed to send request to backend");
        let _ = client.write_all(ERROR_500);
        return 0;
    }

    relay(&mut backend, client)
}

/// Copy bytes from `from` to `to` in fixed-size chunks until `from`
/// reaches EOF or a write to `to` fails (the client went away), matching
/// `buffered_sr`'s read/send loop.
fn relay(from: &mut TcpStream, to: &mut TcpStream) -> usize {
    let mut buf = [0u8; RELAY_BUFFER_SIZE];
    let mut total = 0;
    loop {
        let n = match from.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => {
                debug!(error = %err, "backend read ended");
                break;
            }
        };
        if let Err(err) = to.write_all(&buf[..n]) {
            debug!(error = %err, "client write ended, stopping relay");
            break;
        }
        total += n;
    }
    total
}
