use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;
use strum::Display;

pub const HEADER_END: &[u8] = b"\r\n\r\n";

static FILENAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"filename="(?P<value>[^"]*)(?P<end>")?"#).unwrap());
static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"name="(?P<value>[^"]*)(?P<end>")?"#).unwrap());

/// Offset of the first `\r\n\r\n` in `buf`.
pub fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADER_END.len())
        .position(|window| window == HEADER_END)
}

/// Splits a raw header block into a map keyed by lowercase header name.
///
/// The first occurrence of a name wins. Lines without a `:` are skipped
/// rather than rejected.
pub fn parse_headers(block: &str) -> HashMap<String, String> {
    let mut headers = HashMap::new();

    for line in block.split("\r\n") {
        if let Some((k, v)) = line.split_once(':') {
            headers
                .entry(k.trim_ascii().to_lowercase())
                .or_insert_with(|| v.trim_ascii().to_string());
        }
    }

    headers
}

/// Splits `a=1&b=2` into a map. No percent decoding, first key wins.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        params
            .entry(k.to_string())
            .or_insert_with(|| v.to_string());
    }

    params
}

/// Why an upload ended up under the fallback name.
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    #[strum(serialize = "filename too long")]
    FilenameTooLong,
    #[strum(serialize = "filename end not found")]
    FilenameUnterminated,
    #[strum(serialize = "name too long")]
    NameTooLong,
    #[strum(serialize = "name end not found")]
    NameUnterminated,
    #[strum(serialize = "no filename or name found")]
    Missing,
}

/// Picks the stored filename out of a `Content-Disposition` value.
///
/// `filename="..."` is preferred over `name="..."`, and within each the
/// leftmost occurrence wins. An empty `filename=""` falls through to the
/// `name` search; an empty `name` is treated as missing.
pub fn filename_from_disposition(
    disposition: Option<&str>,
    max_len: usize,
) -> Result<String, FallbackReason> {
    let Some(disposition) = disposition else {
        return Err(FallbackReason::Missing);
    };

    let filename = quoted_param(
        FILENAME_RE.captures(disposition),
        max_len,
        FallbackReason::FilenameTooLong,
        FallbackReason::FilenameUnterminated,
    )?;
    if let Some(filename) = filename {
        return Ok(filename);
    }

    let name = quoted_param(
        NAME_RE.captures(disposition),
        max_len,
        FallbackReason::NameTooLong,
        FallbackReason::NameUnterminated,
    )?;

    name.ok_or(FallbackReason::Missing)
}

fn quoted_param(
    cap: Option<Captures>,
    max_len: usize,
    too_long: FallbackReason,
    unterminated: FallbackReason,
) -> Result<Option<String>, FallbackReason> {
    let Some(cap) = cap else {
        return Ok(None);
    };

    if cap.name("end").is_none() {
        return Err(unterminated);
    }

    let value = cap.name("value").map(|m| m.as_str()).unwrap_or_default();
    if value.len() > max_len {
        return Err(too_long);
    }

    Ok((!value.is_empty()).then(|| value.to_string()))
}
