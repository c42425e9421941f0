use crate::http::method::Method;
use crate::http::parse::{self, HEADER_END};
use bytes::Bytes;
use std::collections::HashMap;
use std::str::FromStr;

/// One request, parsed best-effort out of a single read from a connection.
///
/// Parsing never fails: whatever cannot be recognized is left empty and the
/// handler that needs it decides how to respond.
#[derive(Debug)]
pub struct Request {
    raw: Bytes,
    pub method: Option<Method>,
    pub target: String,
    pub path: String,
    pub query: Option<String>,
    headers: HashMap<String, String>,
    header_block: Bytes,
    body: Option<Bytes>,
}

impl Request {
    pub fn parse(raw: Bytes) -> Request {
        let line_end = raw
            .windows(2)
            .position(|w| w == b"\r\n")
            .unwrap_or(raw.len());
        let request_line = String::from_utf8_lossy(&raw[..line_end]).into_owned();

        let mut parts = request_line.split(' ');
        let method = parts.next().and_then(|m| Method::from_str(m).ok());
        let target = parts.next().unwrap_or_default().to_string();

        let (path, query) = match target.split_once('?') {
            Some((p, q)) => (p.to_string(), Some(q.to_string())),
            None => (target.clone(), None),
        };

        let headers_start = (line_end + 2).min(raw.len());
        let (header_block, body) = match parse::find_header_end(&raw) {
            Some(end) => (
                raw.slice(headers_start.min(end)..end),
                Some(raw.slice(end + HEADER_END.len()..)),
            ),
            None => (raw.slice(headers_start..), None),
        };
        let headers = parse::parse_headers(&String::from_utf8_lossy(&header_block));

        Request {
            raw,
            method,
            target,
            path,
            query,
            headers,
            header_block,
            body,
        }
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn header_block(&self) -> &[u8] {
        &self.header_block
    }

    pub fn get_header(&self, k: &str) -> Option<&str> {
        self.headers.get(&k.to_lowercase()).map(|v| v.as_str())
    }

    /// Bytes after the header/body boundary, `None` when there is no boundary.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub fn query_params(&self) -> HashMap<String, String> {
        self.query.as_deref().map(parse::parse_query).unwrap_or_default()
    }

    /// The `Content-Disposition` value from the request headers, or from the
    /// part headers at the start of a form-data body when the request itself
    /// carries none.
    pub fn content_disposition(&self) -> Option<String> {
        if let Some(v) = self.get_header("content-disposition") {
            return Some(v.to_string());
        }

        let body = self.body.as_ref()?;
        let part_end = parse::find_header_end(body)?;
        let part_headers = parse::parse_headers(&String::from_utf8_lossy(&body[..part_end]));
        part_headers.get("content-disposition").cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &[u8]) -> Request {
        Request::parse(Bytes::copy_from_slice(raw))
    }

    #[test]
    fn request_line_with_query() {
        let req = parse(b"GET /file?name=a.txt&limit=3 HTTP/1.1\r\nHost: x\r\n\r\n");

        assert_eq!(req.method, Some(Method::Get));
        assert_eq!(req.target, "/file?name=a.txt&limit=3");
        assert_eq!(req.path, "/file");
        assert_eq!(req.query.as_deref(), Some("name=a.txt&limit=3"));
        assert_eq!(req.get_header("Host"), Some("x"));
        assert_eq!(req.body().map(|b| &b[..]), Some(&b""[..]));
    }

    #[test]
    fn header_block_and_body_split_at_first_boundary() {
        let req = parse(b"POST /upload HTTP/1.1\r\nA: 1\r\nB: 2\r\n\r\nline\r\n\r\nmore");

        assert_eq!(req.method, Some(Method::Post));
        assert_eq!(req.header_block(), b"A: 1\r\nB: 2");
        assert_eq!(req.body().map(|b| &b[..]), Some(&b"line\r\n\r\nmore"[..]));
    }

    #[test]
    fn missing_boundary_means_no_body() {
        let req = parse(b"POST /upload HTTP/1.1\r\nContent-Disposition: form-data");

        assert!(req.body().is_none());
        assert_eq!(req.get_header("content-disposition"), Some("form-data"));
    }

    #[test]
    fn request_without_crlf_or_known_method() {
        let req = parse(b"BREW /pot");

        assert_eq!(req.method, None);
        assert_eq!(req.path, "/pot");
        assert!(req.header_block().is_empty());
        assert!(req.query_params().is_empty());
    }

    #[test]
    fn boundary_right_after_request_line() {
        let req = parse(b"POST /upload HTTP/1.1\r\n\r\nabc");

        assert!(req.header_block().is_empty());
        assert_eq!(req.body().map(|b| &b[..]), Some(&b"abc"[..]));
    }

    #[test]
    fn disposition_falls_back_to_part_headers() {
        let req = parse(
            b"POST /upload HTTP/1.1\r\nContent-Type: multipart/form-data; boundary=X\r\n\r\n\
              --X\r\nContent-Disposition: form-data; name=\"file\"; filename=\"p.txt\"\r\n\r\ndata",
        );

        assert_eq!(
            req.content_disposition().as_deref(),
            Some("form-data; name=\"file\"; filename=\"p.txt\"")
        );
    }

    #[test]
    fn request_header_disposition_wins() {
        let req = parse(
            b"POST /upload HTTP/1.1\r\nContent-Disposition: form-data; filename=\"h.txt\"\r\n\r\n\
              Content-Disposition: form-data; filename=\"b.txt\"\r\n\r\n",
        );

        assert_eq!(
            req.content_disposition().as_deref(),
            Some("form-data; filename=\"h.txt\"")
        );
    }
}
