//! Fixed-size worker pool, grounded in `requestWorker` from
//! `original_source/src/dkvstore.c`: each worker dequeues one job at a
//! time, dispatches it through the [`Router`](crate::router::Router), and
//! writes the reply back before moving on to the next job.

use std::io::Write;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::queue::Receiver;
use crate::router::Router;

/// A running pool of worker threads. Dropping this does not stop the
/// workers; call [`WorkerPool::join`] (after closing the queue's sender)
/// to wait for them to drain and exit.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `size` worker threads, each pulling jobs off `receiver` until
    /// the channel is closed (every `Sender` dropped).
    pub fn spawn(size: usize, router: Arc<dyn Router>, receiver: Receiver) -> Self {
        let handles = (0..size.max(1))
            .map(|id| {
                let router = Arc::clone(&router);
                let receiver = receiver.clone();
                thread::spawn(move || worker_loop(id, router, receiver))
            })
            .collect();

        WorkerPool { handles }
    }

    /// Block until every worker thread has exited.
    pub fn join(self) {
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}

fn worker_loop(id: usize, router: Arc<dyn Router>, receiver: Receiver) {
    debug!(worker = id, "worker starting");
    for mut job in receiver {
        let response = router.handle(&job.request);
        if let Err(err) = job.stream.write_all(&response.to_bytes()) {
            warn!(worker = id, error = %err, "failed writing reply");
        }
        let _ = job.stream.flush();
    }
    debug!(worker = id, "worker exiting, queue closed");
}
