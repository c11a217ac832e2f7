//! Load balancer entry point.
//!
//! Mirrors `main` in `original_source/src/loadbalancer.c`: take a list of
//! `ip:port` backends on the command line, spawn the coordinator thread,
//! and run the accept loop until killed.

use std::sync::Arc;
use std::thread;

use clap::Parser;
use loadbalancer::{Backend, BackendPool, Server};
use tracing::info;

/// Port the reference hardcodes for the load balancer.
const DEFAULT_PORT: u16 = 5555;

#[derive(Parser, Debug)]
#[command(
    name = "loadbalancer",
    about = "Sticky HTTP load balancer for coordinator nodes"
)]
struct Args {
    /// Local port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// `ip:port` backends to forward to, e.g. 127.0.0.1:6000 127.0.0.1:6001
    #[arg(required = true)]
    backends: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let args = Args::parse();

    let mut backends = Vec::with_capacity(args.backends.len());
    for addr in &args.backends {
        let (ip, port) = addr
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("invalid backend address: {addr}"))?;
        let port: u16 = port.parse()?;
        info!(ip, port, "registered backend");
        backends.push(Backend::new(ip, port));
    }

    let pool = Arc::new(BackendPool::new(backends));
    let (sender, receiver) = loadbalancer::connection::unbounded();

    let coordinator_pool = Arc::clone(&pool);
    thread::spawn(move || loadbalancer::coordinator::run(receiver, coordinator_pool));

    let server = Server::bind(&format!("0.0.0.0:{}", args.port), sender, pool)?;
    server.run();

    Ok(())
}
