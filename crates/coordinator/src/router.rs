//! `Router` implementation for a COORDINATOR node.
//!
//! Grounded in the `SERVER_TYPE_COORDINATOR` branches of `requestHandle`
//! and `coordinator_requestForward` in `original_source/src/dkvstore.c`:
//! GET/SET resolve an owning STORE off the ring and forward the request
//! to it; REM/SYNC aren't implemented on this path; ADD/DEL mutate the
//! ring's membership directly instead of touching any STORE.
//!
//! The reference strips an `ip-N` virtual-node suffix off the owner's
//! address before connecting, because its ring stores one entry per
//! virtual node. This ring stores one [`corelib::Node`] per physical
//! server regardless of vnode count, so no such suffix ever exists and no
//! stripping is needed.
//!
//! The reference's forwarding loop also ignores `connect`/`write`/`read`
//! failures and simply leaves the client hanging. This forwards the same
//! way but replies 500 on any I/O failure instead of dropping the
//! connection silently.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Arc;

use corelib::{Error as RingError, HashRing};
use pipeline::http::{Method, Request, Response, Status};
use pipeline::{Command, Router};
use tracing::warn;

pub struct CoordinatorRouter {
    ring: Arc<HashRing>,
}

impl CoordinatorRouter {
    pub fn new(ring: Arc<HashRing>) -> Self {
        Self { ring }
    }

    /// Open a fresh connection to `ip:port`, write `request` verbatim, and
    /// read the store's reply to EOF. Mirrors `coordinator_requestForward`'s
    /// connect-write-read-close sequence, but surfaces failures as a 500
    /// instead of swallowing them.
    fn forward(&self, ip: &str, port: u16, request: &[u8]) -> Response {
        match forward_request(ip, port, request) {
            Ok(reply) => Response::raw(reply),
            Err(err) => {
                warn!(ip, port, error = %err, "forwarding to store failed");
                Response::status(Status::InternalServerError)
            }
        }
    }
}

fn forward_request(ip: &str, port: u16, request: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut stream = TcpStream::connect((ip, port))?;
    stream.write_all(request)?;
    stream.flush()?;
    let mut reply = Vec::new();
    stream.read_to_end(&mut reply)?;
    Ok(reply)
}

impl Router for CoordinatorRouter {
    fn handle(&self, request: &Request) -> Response {
        match request.method {
            Method::Get => Response::status(Status::Ok),
            Method::Post => match Command::parse(&request.body) {
                Some(Command::Get { key }) => match self.ring.tracked_owner(&key) {
                    Some(node) => self.forward(&node.ip, node.port, &request.raw),
                    None => Response::status(Status::NotFound),
                },
                Some(Command::Set { key, .. }) => match self.ring.add_key(&key) {
                    Ok(owner) => match self.ring.get_node(&owner) {
                        Some(node) => self.forward(&node.ip, node.port, &request.raw),
                        None => Response::status(Status::InternalServerError),
                    },
                    Err(RingError::EmptyRing) => Response::status(Status::NotFound),
                    Err(_) => Response::status(Status::BadRequest),
                },
                Some(Command::Rem { .. }) => Response::status(Status::NotImplemented),
                Some(Command::Add { ip, port, weight }) => {
                    match self.ring.add_server(&ip, port, weight) {
                        Ok(_) => Response::status(Status::Ok),
                        Err(_) => Response::status(Status::BadRequest),
                    }
                }
                Some(Command::Del { ip, port }) => match self.ring.lookup_server(&ip, port) {
                    Some(node) => {
                        self.ring.remove_server(node.id);
                        Response::status(Status::Ok)
                    }
                    None => Response::status(Status::NotFound),
                },
                Some(Command::Sync) => Response::status(Status::NotImplemented),
                None => Response::status(Status::BadRequest),
            },
            Method::Unknown => Response::status(Status::NotImplemented),
        }
    }
}
