use crate::http::status::Status;

pub const TEXT_PLAIN: &str = "text/plain";
pub const APPLICATION_JSON: &str = "application/json";

/// A single-shot response: status line, one `Content-Type` header and a body.
///
/// No other headers are ever written; the connection is closed after the
/// body, which is how the client learns where it ends.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: Status,
    pub content_type: &'static str,
    pub content: Vec<u8>,
}

impl Response {
    pub fn from_parts(status: Status, content_type: &'static str, content: Vec<u8>) -> Response {
        Response {
            status,
            content_type,
            content,
        }
    }

    pub fn text(status: Status, body: &str) -> Response {
        Self::from_parts(status, TEXT_PLAIN, body.as_bytes().to_vec())
    }

    pub fn json(body: String) -> Response {
        Self::from_parts(Status::OK, APPLICATION_JSON, body.into_bytes())
    }
}

pub fn serialize_response(response: &Response) -> Vec<u8> {
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\n\r\n",
        response.status.code_num, response.status.message, response.content_type
    );

    let mut resp_bytes = Vec::with_capacity(head.len() + response.content.len());
    resp_bytes.extend(head.as_bytes());
    resp_bytes.extend(&response.content);
    resp_bytes
}
