//! The coordinator thread: dequeues validated connections and spawns a
//! detached forwarder thread per request.
//!
//! Grounded in `coordinatorForwardRequests`/`consumerForwardSingleRequest`
//! from `original_source/src/loadbalancer.c`. The reference polls a flag
//! under a mutex to decide when to stop; this instead just runs until the
//! channel closes (every `Sender` dropped), which happens when the
//! server's accept loop, the only thing holding a `Sender`, exits.

use std::sync::Arc;
use std::thread;

use tracing::debug;

use crate::backend::BackendPool;
use crate::connection::Receiver;
use crate::forwarder;

/// Drain `queue`, spawning one forwarder thread per connection. Blocks
/// until the queue is closed; call this from a dedicated thread the way
/// `main` spawns `coordinatorForward`.
pub fn run(queue: Receiver, backends: Arc<BackendPool>) {
    for mut record in queue {
        let backends = Arc::clone(&backends);
        thread::spawn(move || {
            let Some(backend) = backends.get(record.backend_index) else {
                debug!(peer = %record.peer, "backend index vanished, rejecting");
                forwarder::reject(&mut record.client);
                return;
            };
            let (ip, port) = backend.address();
            let bytes = forwarder::forward(&mut record.client, &ip, port, &record.request);
            debug!(peer = %record.peer, ip, port, bytes, "forwarded request");
        });
    }
    debug!("coordinator exiting, queue closed");
}
