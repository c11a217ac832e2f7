//! Parses a POST body into one of the six store/coordinator verbs.
//!
//! Grounded in `requestHandle`'s `op=<VERB>&...` wire format from
//! `original_source/src/dkvstore.c`, using the `cmd=<VERB>&...` field name
//! this system documents on the wire. The reference walks this with
//! destructive, in-place `strtok` calls (and, for `ADD`/`DEL`, resumes
//! tokenizing from a pointer computed off a previous token's length, a
//! fragile trick that breaks if the buffer is ever copied or re-ordered).
//! This parser instead splits the body into borrowed `&`/`=` pairs up
//! front and indexes into them, which is both safer and easier to test.

/// A decoded command. `Sync` and `Unknown` carry no data; everything else
/// mirrors the fields the reference pulls out of the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `cmd=GET&<anything>=<key>`: the field name is ignored, only its
    /// value (the key to look up) matters, per the reference.
    Get { key: String },
    /// `cmd=SET&<key>=<value>`: here the field *name* is the key.
    Set { key: String, value: String },
    /// `cmd=REM&<anything>=<key>`.
    Rem { key: String },
    /// `cmd=ADD&key=<ip>&port=<port>&weight=<vnodes>`.
    Add { ip: String, port: u16, weight: usize },
    /// `cmd=DEL&key=<ip>&port=<port>`.
    Del { ip: String, port: u16 },
    /// `cmd=SYNC`.
    Sync,
}

/// Split `body` into ordered `&`-delimited `key=value` pairs, the way the
/// reference's two-level `strtok("&")`/`strtok("=")` does, but without
/// mutating anything.
fn pairs(body: &str) -> Vec<(&str, &str)> {
    body.split('&').filter_map(|kv| kv.split_once('=')).collect()
}

impl Command {
    /// Parse a POST body. Returns `None` if the body is malformed (missing
    /// the leading `cmd=` pair, or a verb missing one of its required
    /// fields); callers should reply 400 in that case.
    pub fn parse(body: &str) -> Option<Command> {
        let pairs = pairs(body);
        let (op_field, op_value) = pairs.first()?;
        if *op_field != "cmd" {
            return None;
        }

        match *op_value {
            "GET" => Some(Command::Get {
                key: pairs.get(1)?.1.to_string(),
            }),
            "SET" => {
                let (key, value) = pairs.get(1)?;
                Some(Command::Set {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            }
            "REM" => Some(Command::Rem {
                key: pairs.get(1)?.1.to_string(),
            }),
            "ADD" => {
                let ip = pairs.get(1)?.1.to_string();
                let port: u16 = pairs.get(2)?.1.parse().ok()?;
                let weight: usize = pairs.get(3)?.1.parse().ok()?;
                Some(Command::Add { ip, port, weight })
            }
            "DEL" => {
                let ip = pairs.get(1)?.1.to_string();
                let port: u16 = pairs.get(2)?.1.parse().ok()?;
                Some(Command::Del { ip, port })
            }
            "SYNC" => Some(Command::Sync),
            _ => None,
        }
    }
}
