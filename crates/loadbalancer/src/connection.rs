//! A queued, already-validated request waiting to be forwarded.
//!
//! Grounded in `connection_t` from
//! `original_source/src/include/loadbalancer.h`: client socket, peer
//! address, the raw request bytes, and which backend to forward to.

use std::net::{SocketAddr, TcpStream};

/// One accepted connection, read and validated by a producer thread and
/// handed to the coordinator thread for forwarding.
pub struct ConnectionRecord {
    pub client: TcpStream,
    pub peer: SocketAddr,
    pub request: Vec<u8>,
    pub backend_index: usize,
}

pub type Sender = crossbeam::channel::Sender<ConnectionRecord>;
pub type Receiver = crossbeam::channel::Receiver<ConnectionRecord>;

/// Build a fresh, unbounded connection queue. The reference head-inserts
/// in the producer and tail-removes in the coordinator with two
/// independent mutexes; an unbounded MPMC channel gives the same
/// ordering without either lock.
pub fn unbounded() -> (Sender, Receiver) {
    crossbeam::channel::unbounded()
}
