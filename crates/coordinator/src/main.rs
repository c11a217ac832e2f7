//! COORDINATOR node entry point.
//!
//! Mirrors `serverBecomeCoordinator` from `original_source/src/dkvstore.c`:
//! seed the ring from a fixed list of stores (weight 10 vnodes each, the
//! reference's hardcoded constant), then accept connections and dispatch
//! GET/SET/ADD/DEL against the ring instead of a local table.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;
use coordinator::CoordinatorRouter;
use corelib::HashRing;
use pipeline::{Server, WorkerPool};
use tracing::info;

/// Virtual nodes assigned to each store named on the command line,
/// matching `serverBecomeCoordinator`'s hardcoded seed weight.
const SEED_WEIGHT: usize = 10;

/// A coordinator routes client requests to the STORE that owns the key,
/// tracking cluster membership in its own consistent hash ring.
#[derive(Parser, Debug)]
#[command(name = "coordinator", about = "Consistent-hash coordinator node")]
struct Args {
    /// Local port to listen on.
    #[arg(short, long)]
    port: u16,

    /// Worker threads draining the request queue.
    #[arg(short, long, default_value_t = 4)]
    workers: usize,

    /// Comma-separated `ip:port` list of stores to seed the ring with.
    #[arg(short, long, value_delimiter = ',')]
    store: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let args = Args::parse();
    info!(port = args.port, workers = args.workers, "starting coordinator");

    let ring = Arc::new(HashRing::new());
    for addr in &args.store {
        let (ip, port) = addr
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("invalid store address: {addr}"))?;
        let port: u16 = port.parse()?;
        ring.add_server(ip, port, SEED_WEIGHT)?;
        info!(ip, port, "seeded store");
    }

    let router = Arc::new(CoordinatorRouter::new(ring));

    let (sender, receiver) = pipeline::queue::unbounded();
    let pool = WorkerPool::spawn(args.workers, router, receiver);

    let stop = Arc::new(AtomicBool::new(false));
    let server = Server::bind(&format!("0.0.0.0:{}", args.port), sender, stop)?;
    server.run();

    pool.join();
    Ok(())
}
