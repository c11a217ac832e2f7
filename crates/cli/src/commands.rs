//! Subcommands for exercising a ring built from a `--servers` list. Every
//! invocation is stateless: the ring is rebuilt from the given servers,
//! the requested operation runs against it, and the result is printed.

use clap::Subcommand;
use corelib::RingBuilder;
use serde_json::json;

use crate::config::CliConfig;

pub type CommandResult = anyhow::Result<()>;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show token ownership and load distribution across the ring.
    Inspect,
    /// Look up which server currently owns a key.
    Lookup {
        key: String,
    },
    /// Add a server to the ring and show how ownership shifted.
    Add {
        #[arg(value_name = "IP:PORT")]
        address: String,
        #[arg(long, default_value_t = 10)]
        weight: usize,
    },
    /// Remove a server from the ring and show how ownership shifted.
    Remove {
        #[arg(value_name = "IP:PORT")]
        address: String,
    },
}

fn parse_address(address: &str) -> anyhow::Result<(String, u16)> {
    let (ip, port) = address
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("expected <ip>:<port>, got {address:?}"))?;
    Ok((ip.to_string(), port.parse()?))
}

fn build_ring(config: &CliConfig) -> anyhow::Result<corelib::HashRing> {
    let mut builder = RingBuilder::new().with_vnodes(config.vnodes);
    for entry in &config.servers {
        let (ip, port) = parse_address(entry)?;
        builder = builder.add_server(ip, port);
    }
    Ok(builder.build()?)
}

/// Render a ring's current membership, either as the human-readable
/// summary `Topology::describe` builds or, with `--json`, as a
/// machine-readable ownership breakdown.
fn print_topology(config: &CliConfig, ring: &corelib::HashRing) {
    let topology = corelib::Topology::new(ring);
    if !config.json {
        println!("{}", topology.describe());
        return;
    }

    let percentages = topology.ownership_percentages();
    let ownership = topology.ownership();
    let mut servers: Vec<_> = ring
        .nodes()
        .into_iter()
        .map(|node| {
            json!({
                "id": node.id.to_string(),
                "address": node.address(),
                "tokens": ownership.get(&node.id).map(|t| t.len()).unwrap_or(0),
                "ownership_pct": percentages.get(&node.id).copied().unwrap_or(0.0),
            })
        })
        .collect();
    servers.sort_by(|a, b| a["address"].as_str().cmp(&b["address"].as_str()));

    let out = json!({
        "algorithm": ring.partitioner_name(),
        "servers": ring.node_count(),
        "tokens": ring.token_count(),
        "ownership": servers,
    });
    println!("{}", serde_json::to_string_pretty(&out).expect("json-serializable"));
}

pub fn execute(config: &CliConfig) -> CommandResult {
    let ring = build_ring(config)?;

    match &config.command {
        Command::Inspect => print_topology(config, &ring),
        Command::Lookup { key } => {
            let owner = ring.lookup_node(key);
            if config.json {
                let out = json!({
                    "key": key,
                    "owner": owner.as_ref().map(|n| json!({"id": n.id.to_string(), "address": n.address()})),
                });
                println!("{}", serde_json::to_string_pretty(&out).expect("json-serializable"));
            } else {
                match owner {
                    Some(node) => println!("{key} -> {node}"),
                    None => println!("{key} -> (no servers in ring)"),
                }
            }
        }
        Command::Add { address, weight } => {
            let (ip, port) = parse_address(address)?;
            let id = ring.add_server(&ip, port, *weight)?;
            if !config.json {
                println!("added {ip}:{port} as {id}");
            }
            print_topology(config, &ring);
        }
        Command::Remove { address } => {
            let (ip, port) = parse_address(address)?;
            match ring.lookup_server(&ip, port) {
                Some(node) => {
                    ring.remove_server(node.id);
                    if !config.json {
                        println!("removed {ip}:{port}");
                    }
                    print_topology(config, &ring);
                }
                None => {
                    if config.json {
                        println!(
                            "{}",
                            json!({"error": format!("{ip}:{port} is not in the ring")})
                        );
                    } else {
                        println!("{ip}:{port} is not in the ring");
                    }
                }
            }
        }
    }

    Ok(())
}
