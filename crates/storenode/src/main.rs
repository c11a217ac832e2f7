//! STORE node entry point.
//!
//! Mirrors `serverBecomeStore` from `original_source/src/dkvstore.c`:
//! build a local table, start the worker pool, and accept connections
//! until asked to stop.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;
use corelib::hash::HashAlgorithm;
use kvstore::LocalMap;
use pipeline::{Server, WorkerPool};
use storenode::StoreRouter;
use tracing::info;

/// A store node holds a shard of the cluster's key/value pairs and serves
/// GET/SET/REM directly against its local table.
#[derive(Parser, Debug)]
#[command(name = "storenode", about = "Consistent-hash store node")]
struct Args {
    /// Local port to listen on.
    #[arg(short, long)]
    port: u16,

    /// Worker threads draining the request queue.
    #[arg(short, long, default_value_t = 4)]
    workers: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let args = Args::parse();
    info!(port = args.port, workers = args.workers, "starting store node");

    let table = LocalMap::new(HashAlgorithm::Jenkins);
    let router = Arc::new(StoreRouter::new(table));

    let (sender, receiver) = pipeline::queue::unbounded();
    let pool = WorkerPool::spawn(args.workers, router, receiver);

    let stop = Arc::new(AtomicBool::new(false));
    let server = Server::bind(&format!("0.0.0.0:{}", args.port), sender, stop)?;
    server.run();

    pool.join();
    Ok(())
}
