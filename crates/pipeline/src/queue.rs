//! The work queue handed from accepted connections to the worker pool.
//!
//! The reference (`requestWorker`/`serverHandleRequest` in
//! `original_source/src/dkvstore.c`) protects a hand-rolled `TAILQ` with two
//! mutexes, one for head-insert (producers) and one for tail-remove
//! (workers). An unbounded MPMC channel gives the same head-in/tail-out
//! ordering with neither mutex nor manual signaling.

use std::net::TcpStream;

use crate::http::Request;

/// One parsed request plus the socket it arrived on, queued for a worker.
pub struct Job {
    pub stream: TcpStream,
    pub request: Request,
}

pub type Sender = crossbeam::channel::Sender<Job>;
pub type Receiver = crossbeam::channel::Receiver<Job>;

/// Build a fresh, unbounded job queue.
pub fn unbounded() -> (Sender, Receiver) {
    crossbeam::channel::unbounded()
}
