//! Request pipeline: HTTP parsing, verb decoding, the `Router` dispatch
//! seam, and the accept-loop/worker-pool machinery that ties them
//! together. Node binaries (`storenode`, `coordinator`) provide a
//! `Router` impl and call [`server::Server`] to start serving.

pub mod command;
pub mod http;
pub mod queue;
pub mod router;
pub mod server;
pub mod worker;

pub use command::Command;
pub use http::{Method, Request, Response, Status};
pub use queue::Job;
pub use router::Router;
pub use server::Server;
pub use worker::WorkerPool;
