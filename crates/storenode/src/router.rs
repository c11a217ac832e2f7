//! `Router` implementation for a STORE node.
//!
//! Grounded in the `SERVER_TYPE_STORE` branches of `requestHandle` in
//! `original_source/src/dkvstore.c`: GET/SET/REM act directly on the local
//! table; ADD/DEL/SYNC are not store operations and are rejected.

use kvstore::LocalMap;
use pipeline::http::{Method, Request, Response, Status};
use pipeline::{Command, Router};

pub struct StoreRouter {
    table: LocalMap,
}

impl StoreRouter {
    pub fn new(table: LocalMap) -> Self {
        Self { table }
    }
}

impl Router for StoreRouter {
    fn handle(&self, request: &Request) -> Response {
        match request.method {
            Method::Get => Response::status(Status::Ok),
            Method::Post => match Command::parse(&request.body) {
                Some(Command::Get { key }) => match self.table.lookup(&key) {
                    Some(value) => Response::with_body(Status::Ok, format!("{key}={value}")),
                    None => Response::status(Status::NotFound),
                },
                Some(Command::Set { key, value }) => match self.table.insert(&key, &value) {
                    Ok(()) => Response::status(Status::Ok),
                    Err(_) => Response::status(Status::BadRequest),
                },
                Some(Command::Rem { key }) => match self.table.remove(&key) {
                    Ok(()) => Response::status(Status::Ok),
                    Err(_) => Response::status(Status::NotFound),
                },
                Some(Command::Add { .. }) | Some(Command::Del { .. }) => {
                    Response::status(Status::BadRequest)
                }
                Some(Command::Sync) => Response::status(Status::NotImplemented),
                None => Response::status(Status::BadRequest),
            },
            Method::Unknown => Response::status(Status::NotImplemented),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::hash::HashAlgorithm;

    fn router() -> StoreRouter {
        StoreRouter::new(LocalMap::new(HashAlgorithm::Jenkins))
    }

    fn post(body: &str) -> Request {
        Request::parse(format!("POST / HTTP/1.1\r\nContent-Length: {}\r\n\r\n{}", body.len(), body).as_bytes())
    }

    #[test]
    fn set_then_get_roundtrips() {
        let router = router();
        let set = router.handle(&post("cmd=SET&username=bob"));
        assert_eq!(set.status_code(), 200);

        let get = router.handle(&post("cmd=GET&key=username"));
        assert_eq!(get.status_code(), 200);
    }

    #[test]
    fn get_unknown_key_is_404() {
        let router = router();
        let resp = router.handle(&post("cmd=GET&key=missing"));
        assert_eq!(resp.status_code(), 404);
    }

    #[test]
    fn duplicate_set_is_400() {
        let router = router();
        router.handle(&post("cmd=SET&username=bob"));
        let resp = router.handle(&post("cmd=SET&username=alice"));
        assert_eq!(resp.status_code(), 400);
    }

    #[test]
    fn rem_missing_key_is_404() {
        let router = router();
        let resp = router.handle(&post("cmd=REM&key=missing"));
        assert_eq!(resp.status_code(), 404);
    }

    #[test]
    fn add_and_del_are_rejected_on_a_store() {
        let router = router();
        let add = router.handle(&post("cmd=ADD&key=10.0.0.1&port=7000&weight=10"));
        assert_eq!(add.status_code(), 400);
        let del = router.handle(&post("cmd=DEL&key=10.0.0.1&port=7000"));
        assert_eq!(del.status_code(), 400);
    }

    #[test]
    fn sync_is_not_implemented() {
        let router = router();
        let resp = router.handle(&post("cmd=SYNC"));
        assert_eq!(resp.status_code(), 501);
    }

    #[test]
    fn plain_get_request_is_a_health_check() {
        let router = router();
        let req = Request::parse(b"GET / HTTP/1.1\r\n\r\n");
        assert_eq!(router.handle(&req).status_code(), 200);
    }
}
