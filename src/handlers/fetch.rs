use crate::http::request::Request;
use crate::http::response::{Response, TEXT_PLAIN};
use crate::http::status::Status;
use crate::http::{bad_request, internal_error, not_found};
use crate::store::{FileStore, StoreError};
use log::{error, warn};

/// `GET /file?name=<name>&limit=<bytes>`: the first `limit` bytes of a file.
pub fn get_file(r: &Request, store: &FileStore) -> Response {
    let params = r.query_params();

    let name = match params.get("name") {
        Some(name) if !name.is_empty() => name,
        _ => {
            warn!("no file name in query {:?} for {}", r.query, r.path);
            return not_found("File not found");
        }
    };
    let limit = parse_limit(params.get("limit").map(String::as_str));

    match store.read_prefix(name, limit) {
        Ok(content) => Response::from_parts(Status::OK, TEXT_PLAIN, content),
        Err(StoreError::NotFound(_)) => not_found("File not found"),
        Err(StoreError::InvalidName(name)) => {
            warn!("rejected fetch of file name {name:?}");
            bad_request("Bad Request: Invalid filename")
        }
        Err(StoreError::Io(e)) => {
            error!("failed to read {name}: {e}");
            internal_error("Failed to read file")
        }
    }
}

/// Missing, unparsable and negative limits all read nothing.
fn parse_limit(raw: Option<&str>) -> u64 {
    match raw.map(str::parse::<i64>) {
        Some(Ok(limit)) => limit.max(0).unsigned_abs(),
        Some(Err(_)) => {
            warn!("unparsable limit {raw:?}, reading nothing");
            0
        }
        None => 0,
    }
}
