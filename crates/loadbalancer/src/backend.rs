//! The pool of backends the load balancer forwards to.
//!
//! Grounded in `servers_t`/`forwarder_t` from
//! `original_source/src/include/loadbalancer.h`: a flat array of backend
//! addresses, each with a forward counter guarded by its own mutex so
//! picking a backend never contends with counting another one's
//! forwards.

use parking_lot::Mutex;
use rand::Rng;

/// One backend the load balancer can forward to.
pub struct Backend {
    pub ip: String,
    pub port: u16,
    forwards: Mutex<u64>,
}

impl Backend {
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self {
            ip: ip.into(),
            port,
            forwards: Mutex::new(0),
        }
    }

    pub fn address(&self) -> (String, u16) {
        (self.ip.clone(), self.port)
    }

    fn record_forward(&self) {
        *self.forwards.lock() += 1;
    }

    pub fn forward_count(&self) -> u64 {
        *self.forwards.lock()
    }
}

/// An immutable set of backends, indexed the same way for the lifetime of
/// the process, matching `setupForwardServers`, which only ever appends
/// at startup and never removes a backend at runtime.
pub struct BackendPool {
    backends: Vec<Backend>,
}

impl BackendPool {
    pub fn new(backends: Vec<Backend>) -> Self {
        Self { backends }
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Backend> {
        self.backends.get(index)
    }

    /// Pick a backend at random, mirroring `pickforwarder`'s
    /// `rand() % numberofservers`, and bump its forward counter.
    pub fn pick_random(&self) -> Option<usize> {
        if self.backends.is_empty() {
            return None;
        }
        let index = rand::thread_rng().gen_range(0..self.backends.len());
        self.backends[index].record_forward();
        Some(index)
    }

    /// Resolve a sticky `forwarderid` cookie index, validating it is in
    /// range, and bump its forward counter the same as a random pick.
    pub fn pick_sticky(&self, index: usize) -> Option<usize> {
        let backend = self.backends.get(index)?;
        backend.record_forward();
        Some(index)
    }
}
