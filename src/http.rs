pub mod handler;
pub mod method;
pub mod parse;
pub mod request;
pub mod response;
pub mod server;
pub mod status;

use response::Response;
use status::Status;

pub fn ok(body: &str) -> Response {
    Response::text(Status::OK, body)
}

pub fn not_found(body: &str) -> Response {
    Response::text(Status::NOT_FOUND, body)
}

pub fn bad_request(body: &str) -> Response {
    Response::text(Status::BAD_REQUEST, body)
}

pub fn internal_error(body: &str) -> Response {
    Response::text(Status::INTERNAL_SERVER_ERROR, body)
}
