//! Content-type validation and strict decoding of `{"Content": "..."}` bodies.

use crate::errors::{StoreError, NO_CONTENT, PARSE_FAILED};
use crate::models::RequestContent;
use log::debug;
use serde_json::{Map, Value};
use std::collections::HashMap;

const JSON_MEDIA_TYPE: &str = "application/json";
const UTF8_CHARSET: &str = "utf-8";
const CONTENT_FIELD: &str = "Content";

/// A parsed `type/subtype; name=value` header. Type and names are lowercased.
#[derive(Debug, PartialEq, Eq)]
pub struct MediaType {
    pub essence: String,
    pub params: HashMap<String, String>,
}

/// Validates the content type, then decodes the body.
pub fn decode(content_type: Option<&str>, body: &[u8]) -> Result<RequestContent, StoreError> {
    validate_content_type(content_type)?;
    decode_body(body)
}

pub fn validate_content_type(content_type: Option<&str>) -> Result<(), StoreError> {
    let media = content_type
        .and_then(parse_media_type)
        .ok_or(StoreError::UnsupportedMediaType)?;
    let charset_ok = media
        .params
        .get("charset")
        .is_some_and(|charset| charset.eq_ignore_ascii_case(UTF8_CHARSET));
    if media.essence != JSON_MEDIA_TYPE || !charset_ok {
        debug!("Rejected content type {:?}", content_type);
        return Err(StoreError::UnsupportedMediaType);
    }
    Ok(())
}

/// Decodes a body that must hold exactly one non-empty `Content` field.
///
/// The field name matches case-insensitively; any other field rejects the body.
pub fn decode_body(body: &[u8]) -> Result<RequestContent, StoreError> {
    if body.is_empty() {
        return Err(StoreError::BadRequest(NO_CONTENT));
    }
    let fields: Map<String, Value> = serde_json::from_slice(body).map_err(|e| {
        debug!("Body decode failed: {}", e);
        StoreError::BadRequest(PARSE_FAILED)
    })?;

    let mut text = None;
    for (name, value) in fields {
        match value {
            Value::String(s) if name.eq_ignore_ascii_case(CONTENT_FIELD) => text = Some(s),
            _ => {
                debug!("Body rejected on field '{}'", name);
                return Err(StoreError::BadRequest(PARSE_FAILED));
            }
        }
    }
    match text {
        Some(text) if !text.is_empty() => Ok(RequestContent { text }),
        _ => Err(StoreError::BadRequest(PARSE_FAILED)),
    }
}

/// Parses a media type with its parameters.
///
/// Whitespace is allowed around `;` and `=`, values may be tokens or quoted
/// strings, and one trailing `;` is ignored. Returns `None` on any malformed
/// parameter or a repeated parameter name.
pub fn parse_media_type(value: &str) -> Option<MediaType> {
    let (essence, mut rest) = match value.find(';') {
        Some(idx) => (&value[..idx], &value[idx..]),
        None => (value, ""),
    };
    let essence = essence.trim().to_ascii_lowercase();
    let (kind, subtype) = essence.split_once('/')?;
    if !is_token(kind) || !is_token(subtype) {
        return None;
    }

    let mut params = HashMap::new();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        if rest.trim_end() == ";" {
            break;
        }
        let (name, val, remaining) = parse_param(rest.strip_prefix(';')?)?;
        if params.insert(name, val).is_some() {
            return None;
        }
        rest = remaining;
    }

    Some(MediaType { essence, params })
}

fn parse_param(input: &str) -> Option<(String, String, &str)> {
    let input = input.trim_start();
    let name_len = token_len(input);
    if name_len == 0 {
        return None;
    }
    let name = input[..name_len].to_ascii_lowercase();
    let input = input[name_len..].trim_start().strip_prefix('=')?.trim_start();

    if let Some(quoted) = input.strip_prefix('"') {
        let (val, remaining) = parse_quoted(quoted)?;
        return Some((name, val, remaining));
    }
    let val_len = token_len(input);
    if val_len == 0 {
        return None;
    }
    Some((name, input[..val_len].to_string(), &input[val_len..]))
}

/// Reads a quoted string after its opening quote.
fn parse_quoted(input: &str) -> Option<(String, &str)> {
    let mut val = String::new();
    let mut chars = input.char_indices();
    while let Some((idx, c)) = chars.next() {
        match c {
            '"' => return Some((val, &input[idx + 1..])),
            '\\' => val.push(chars.next()?.1),
            _ => val.push(c),
        }
    }
    None
}

fn is_tspecial(c: char) -> bool {
    "()<>@,;:\\\"/[]?=".contains(c)
}

fn is_token_char(c: char) -> bool {
    c.is_ascii() && c > ' ' && c != '\x7f' && !is_tspecial(c)
}

fn token_len(s: &str) -> usize {
    s.find(|c: char| !is_token_char(c)).unwrap_or(s.len())
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_token_char)
}
