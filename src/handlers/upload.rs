use crate::config::Limits;
use crate::http::parse::{FallbackReason, filename_from_disposition};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::status::Status;
use crate::http::{bad_request, internal_error, ok};
use crate::store::{FileStore, StoreError};
use bytes::Bytes;
use log::{debug, error, info, warn};
use thiserror::Error;

/// Stored name used when no usable filename could be extracted.
pub const FALLBACK_NAME: &str = "default_upload";

#[derive(Debug, Error, PartialEq)]
pub enum UploadError {
    #[error("no header/body boundary in upload request")]
    MissingBody,
    #[error("upload of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },
}

/// What an upload request resolves to before anything touches the disk.
#[derive(Debug)]
pub struct UploadDescriptor {
    pub filename: String,
    pub fallback: Option<FallbackReason>,
    pub content: Bytes,
    pub truncated_at_nul: bool,
}

impl UploadDescriptor {
    pub fn from_request(r: &Request, limits: &Limits) -> Result<UploadDescriptor, UploadError> {
        let body = r.body().ok_or(UploadError::MissingBody)?;

        let disposition = r.content_disposition();
        let (filename, fallback) =
            match filename_from_disposition(disposition.as_deref(), limits.max_filename_len) {
                Ok(name) => (name, None),
                Err(reason) => (FALLBACK_NAME.to_string(), Some(reason)),
            };

        // Capture stops at the first NUL byte.
        let nul = body.iter().position(|&b| b == 0);
        let content = body.slice(..nul.unwrap_or(body.len()));

        if content.len() > limits.max_upload_size {
            return Err(UploadError::TooLarge {
                size: content.len(),
                limit: limits.max_upload_size,
            });
        }

        Ok(UploadDescriptor {
            filename,
            fallback,
            content,
            truncated_at_nul: nul.is_some(),
        })
    }
}

pub fn upload_file(r: &Request, store: &FileStore, limits: &Limits) -> Response {
    debug!("upload headers: {}", String::from_utf8_lossy(r.header_block()));

    let upload = match UploadDescriptor::from_request(r, limits) {
        Ok(upload) => upload,
        Err(UploadError::MissingBody) => return bad_request("Bad Request: No file data"),
        Err(e @ UploadError::TooLarge { .. }) => {
            warn!("{e}");
            return Response::text(Status::PAYLOAD_TOO_LARGE, "File exceeds size limit");
        }
    };

    if let Some(reason) = upload.fallback {
        warn!("{reason}, using default name {FALLBACK_NAME}");
    }
    if upload.truncated_at_nul {
        warn!(
            "upload for {} contains a NUL byte, keeping the first {} bytes",
            upload.filename,
            upload.content.len()
        );
    }

    match store.write(&upload.filename, &upload.content) {
        Ok(path) => {
            info!(
                "stored {} at {} ({} bytes)",
                upload.filename,
                path.display(),
                upload.content.len()
            );
            ok("File uploaded successfully")
        }
        Err(StoreError::InvalidName(name)) => {
            warn!("rejected upload with file name {name:?}");
            bad_request("Bad Request: Invalid filename")
        }
        Err(e) => {
            error!("failed to write {}: {e}", upload.filename);
            internal_error("Failed to write file")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn request(raw: &[u8]) -> Request {
        Request::parse(Bytes::copy_from_slice(raw))
    }

    fn body_of(resp: &Response) -> &str {
        std::str::from_utf8(&resp.content).unwrap()
    }

    #[test]
    fn stores_body_under_filename() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let req = request(
            b"POST /upload HTTP/1.1\r\n\
              Content-Disposition: form-data; name=\"file\"; filename=\"hello.txt\"\r\n\r\nhi",
        );

        let resp = upload_file(&req, &store, &Limits::default());

        assert_eq!(resp.status, Status::OK);
        assert_eq!(body_of(&resp), "File uploaded successfully");
        assert_eq!(fs::read(dir.path().join("hello.txt")).unwrap(), b"hi");
    }

    #[test]
    fn body_is_cut_at_first_nul() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let req = request(
            b"POST /upload HTTP/1.1\r\nContent-Disposition: form-data; filename=\"bin\"\r\n\r\nab\0cd",
        );

        let upload = UploadDescriptor::from_request(&req, &Limits::default()).unwrap();
        assert!(upload.truncated_at_nul);
        assert_eq!(&upload.content[..], b"ab");

        let resp = upload_file(&req, &store, &Limits::default());
        assert_eq!(resp.status, Status::OK);
        assert_eq!(fs::read(dir.path().join("bin")).unwrap(), b"ab");
    }

    #[test]
    fn missing_names_use_fallback() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let req = request(b"POST /upload HTTP/1.1\r\nContent-Type: text/plain\r\n\r\ndata");

        let upload = UploadDescriptor::from_request(&req, &Limits::default()).unwrap();
        assert_eq!(upload.filename, FALLBACK_NAME);
        assert_eq!(upload.fallback, Some(FallbackReason::Missing));

        let resp = upload_file(&req, &store, &Limits::default());
        assert_eq!(resp.status, Status::OK);
        assert_eq!(fs::read(dir.path().join(FALLBACK_NAME)).unwrap(), b"data");
    }

    #[test]
    fn overlong_filename_uses_fallback() {
        let raw = format!(
            "POST /upload HTTP/1.1\r\nContent-Disposition: form-data; filename=\"{}\"\r\n\r\nx",
            "n".repeat(300)
        );
        let upload =
            UploadDescriptor::from_request(&request(raw.as_bytes()), &Limits::default()).unwrap();

        assert_eq!(upload.filename, FALLBACK_NAME);
        assert_eq!(upload.fallback, Some(FallbackReason::FilenameTooLong));
    }

    #[test]
    fn no_boundary_is_bad_request() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let req = request(b"POST /upload HTTP/1.1\r\nContent-Disposition: form-data; filename=\"x\"");

        let resp = upload_file(&req, &store, &Limits::default());

        assert_eq!(resp.status, Status::BAD_REQUEST);
        assert_eq!(body_of(&resp), "Bad Request: No file data");
        assert!(!dir.path().join("x").exists());
    }

    #[test]
    fn oversized_upload_is_rejected() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let limits = Limits {
            max_upload_size: 4,
            ..Limits::default()
        };
        let req = request(
            b"POST /upload HTTP/1.1\r\nContent-Disposition: form-data; filename=\"big\"\r\n\r\n12345",
        );

        assert_eq!(
            UploadDescriptor::from_request(&req, &limits).unwrap_err(),
            UploadError::TooLarge { size: 5, limit: 4 }
        );

        let resp = upload_file(&req, &store, &limits);
        assert_eq!(resp.status, Status::PAYLOAD_TOO_LARGE);
        assert_eq!(body_of(&resp), "File exceeds size limit");
        assert!(!dir.path().join("big").exists());
    }

    #[test]
    fn traversal_name_is_rejected() {
        let outer = tempdir().unwrap();
        let store_dir = outer.path().join("store");
        fs::create_dir(&store_dir).unwrap();
        let store = FileStore::new(&store_dir);
        let req = request(
            b"POST /upload HTTP/1.1\r\nContent-Disposition: form-data; filename=\"../escape\"\r\n\r\nx",
        );

        let resp = upload_file(&req, &store, &Limits::default());

        assert_eq!(resp.status, Status::BAD_REQUEST);
        assert!(!outer.path().join("escape").exists());
    }

    #[test]
    fn unwritable_store_is_server_error() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("missing"));
        let req = request(
            b"POST /upload HTTP/1.1\r\nContent-Disposition: form-data; filename=\"f\"\r\n\r\nx",
        );

        let resp = upload_file(&req, &store, &Limits::default());

        assert_eq!(resp.status, Status::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(&resp), "Failed to write file");
    }
}
