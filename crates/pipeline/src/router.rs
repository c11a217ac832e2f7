//! The dispatch seam between the pipeline and a node's role-specific
//! behavior. `storenode` and `coordinator` each provide their own
//! implementation; the worker pool only knows about this trait.

use crate::http::{Request, Response};

/// Handles one already-parsed request and produces the reply to write
/// back to the client. Implementations must be safe to share across
/// worker threads: the pipeline calls `handle` concurrently from every
/// worker in the pool.
pub trait Router: Send + Sync {
    fn handle(&self, request: &Request) -> Response;
}
