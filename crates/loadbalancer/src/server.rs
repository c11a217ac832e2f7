//! Accept loop and producer threads.
//!
//! Grounded in `beginServerListen`/`producerHandleAccept` from
//! `original_source/src/loadbalancer.c`: the reference blocks forever on
//! `accept()` and spawns a detached producer thread per connection that
//! reads the request, validates it, picks a backend, and enqueues the
//! connection. This keeps the same shape but joins producer threads
//! implicitly (nothing here needs a shutdown flag: the load balancer is
//! meant to run until killed, same as the reference).

use std::io::Read;
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};

use crate::backend::BackendPool;
use crate::connection::{ConnectionRecord, Sender};
use crate::request;

/// A single read's worth of buffer. The reference reads at most 4096
/// bytes once and never grows the buffer, so neither do we.
const READ_BUFFER_SIZE: usize = 4096;

pub struct Server {
    listener: TcpListener,
    queue: Sender,
    backends: Arc<BackendPool>,
}

impl Server {
    pub fn bind(addr: &str, queue: Sender, backends: Arc<BackendPool>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        tracing::info!(%addr, "load balancer listening");
        Ok(Self {
            listener,
            queue,
            backends,
        })
    }

    /// Accept connections forever, spawning one producer thread per
    /// connection. There is no stop flag because, like the reference,
    /// this server is expected to run until the process is killed.
    pub fn run(&self) {
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    debug!(%peer, "accepted connection");
                    let queue = self.queue.clone();
                    let backends = Arc::clone(&self.backends);
                    thread::spawn(move || handle_connection(stream, peer, queue, backends));
                }
                Err(err) => {
                    warn!(error = %err, "accept failed");
                }
            }
        }
    }
}

/// Read one request off `stream`, validate it, pick a backend, and
/// enqueue a [`ConnectionRecord`] for the coordinator thread. Matches
/// `producerHandleAccept`: on any validation failure, reply 500 and stop
/// (the load balancer has no notion of retrying on the same socket).
fn handle_connection(
    mut stream: TcpStream,
    peer: std::net::SocketAddr,
    queue: Sender,
    backends: Arc<BackendPool>,
) {
    let mut buf = [0u8; READ_BUFFER_SIZE];
    let n = match stream.read(&mut buf) {
        Ok(n) => n,
        Err(err) => {
            warn!(%peer, error = %err, "failed reading request");
            return;
        }
    };
    if n == 0 {
        return;
    }
    let request_bytes = buf[..n].to_vec();
    let text = String::from_utf8_lossy(&request_bytes);

    if !request::is_get_request(&text) {
        warn!(%peer, "load balancer only supports HTTP GET");
        crate::forwarder::reject(&mut stream);
        return;
    }

    let backend_index = request::forwarder_cookie(&text)
        .and_then(|index| backends.pick_sticky(index))
        .or_else(|| backends.pick_random());

    let Some(backend_index) = backend_index else {
        warn!(%peer, "no backend available");
        crate::forwarder::reject(&mut stream);
        return;
    };

    let record = ConnectionRecord {
        client: stream,
        peer,
        request: request_bytes,
        backend_index,
    };
    if queue.send(record).is_err() {
        warn!(%peer, "coordinator queue closed, dropping connection");
    }
}
