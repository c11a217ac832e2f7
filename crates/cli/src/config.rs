//! Top-level argument parsing for the ring debugging CLI.
//!
//! This binary is a standalone tool for exercising a ring in isolation.
//! The store and coordinator node processes parse their own, much
//! narrower set of flags directly (`-t/-s/-p/-h`, mirroring the
//! reference's `getopt_long` table) rather than going through this crate.

use clap::Parser;

use crate::commands::{self, Command};

#[derive(Parser, Debug)]
#[command(
    name = "consistent-hash-cli",
    about = "Build a ring from a list of servers and exercise it"
)]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,

    /// Servers to seed the ring with, as repeated `ip:port` values.
    #[arg(long = "server", value_name = "IP:PORT", global = true)]
    pub servers: Vec<String>,

    /// Virtual nodes per server when not seeding with an explicit weight.
    #[arg(long, default_value_t = 128, global = true)]
    pub vnodes: usize,

    /// Print machine-readable JSON instead of the human-readable summary.
    #[arg(long, global = true)]
    pub json: bool,
}

impl CliConfig {
    pub fn run(&self) -> anyhow::Result<()> {
        commands::execute(self)
    }
}
