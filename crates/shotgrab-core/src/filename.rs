//! Capture-time file naming from the asset's Content-Disposition header.
//!
//! The CDN names screenshots `..._<DATE>_<SEQ>.<ext>`. Current uploads carry a
//! compact `YYYYMMDDhhmmss` date; legacy uploads carry `YYYY-MM-DD` and use the
//! sequence number to tell same-day shots apart, so it is added as seconds.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::time::SystemTime;
use thiserror::Error;

const COMPACT_DATE: &str = "%Y%m%d%H%M%S";
const LEGACY_DATE: &str = "%Y-%m-%d";
const OUTPUT_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilenameError {
    #[error("response has no Content-Disposition header")]
    MissingHeader,
    #[error("filename {0:?} does not have date and sequence fields")]
    TooFewFields(String),
    #[error("filename {0:?} has no extension")]
    MissingExtension(String),
    #[error("extension {0:?} is not a plain file suffix")]
    UnsafeExtension(String),
    #[error("invalid sequence number {0:?}")]
    BadSequence(String),
    #[error("invalid capture date {0:?}")]
    BadDate(String),
}

/// Local name for a downloaded screenshot: capture time (UTC) and extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureName {
    pub taken_at: NaiveDateTime,
    pub extension: String,
}

impl CaptureName {
    /// `2023-06-15_14-22-33.png`
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.taken_at.format(OUTPUT_FORMAT), self.extension)
    }

    /// Capture time as a filesystem timestamp.
    pub fn system_time(&self) -> SystemTime {
        SystemTime::from(self.taken_at.and_utc())
    }
}

/// Derives the capture name from a raw Content-Disposition value.
///
/// The filename parameter is preferred; a value without one is split as-is.
/// The second-to-last `_` field is the date, the last is `<sequence>.<ext>`.
pub fn capture_name(content_disposition: &str) -> Result<CaptureName, FilenameError> {
    let filename = filename_param(content_disposition)
        .unwrap_or_else(|| content_disposition.trim().to_string());

    let fields: Vec<&str> = filename.split('_').collect();
    if fields.len() < 2 {
        return Err(FilenameError::TooFewFields(filename));
    }
    let date = fields[fields.len() - 2];
    let tail = fields[fields.len() - 1];

    let (sequence, extension) = tail
        .split_once('.')
        .ok_or_else(|| FilenameError::MissingExtension(filename.clone()))?;
    let extension = extension.trim_matches(|c| c == '"' || c == ';');
    if extension.is_empty() {
        return Err(FilenameError::MissingExtension(filename.clone()));
    }
    if !is_plain_extension(extension) {
        return Err(FilenameError::UnsafeExtension(extension.to_string()));
    }
    let sequence: u64 = sequence
        .parse()
        .map_err(|_| FilenameError::BadSequence(sequence.to_string()))?;

    Ok(CaptureName {
        taken_at: parse_capture_date(date, sequence)?,
        extension: extension.to_string(),
    })
}

/// The extension ends up in a path under the app directory, so it must not
/// name another directory.
fn is_plain_extension(extension: &str) -> bool {
    !extension.contains("..")
        && !extension
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_control())
}

/// Compact timestamp first, then the legacy date plus `sequence` seconds.
pub fn parse_capture_date(date: &str, sequence: u64) -> Result<NaiveDateTime, FilenameError> {
    if let Ok(t) = NaiveDateTime::parse_from_str(date, COMPACT_DATE) {
        return Ok(t);
    }
    let bad = || FilenameError::BadDate(date.to_string());
    let day = NaiveDate::parse_from_str(date, LEGACY_DATE).map_err(|_| bad())?;
    let offset = i64::try_from(sequence)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .ok_or_else(bad)?;
    day.and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.checked_add_signed(offset))
        .ok_or_else(bad)
}

/// `filename*=` (RFC 5987, UTF-8 only) wins over `filename=`; quotes and escapes are removed.
fn filename_param(header_value: &str) -> Option<String> {
    let mut plain: Option<String> = None;

    for param in header_value.split(';') {
        let Some((name, value)) = param.trim().split_once('=') else {
            continue;
        };
        let value = value.trim();
        match name.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                let encoded = value
                    .strip_prefix("UTF-8''")
                    .or_else(|| value.strip_prefix("utf-8''"));
                if let Some(decoded) = encoded.map(percent_decode) {
                    if !decoded.is_empty() {
                        return Some(decoded);
                    }
                }
            }
            "filename" => {
                let unquoted = match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
                    Some(inner) => unescape_quoted(inner),
                    None => value.to_string(),
                };
                if !unquoted.is_empty() {
                    plain = Some(unquoted);
                }
            }
            _ => {}
        }
    }

    plain
}

fn unescape_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next @ ('"' | '\\')) => out.push(next),
                Some(other) => {
                    out.push(c);
                    out.push(other);
                }
                None => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let hex = bytes
            .get(i + 1..i + 3)
            .and_then(|h| std::str::from_utf8(h).ok())
            .and_then(|h| u8::from_str_radix(h, 16).ok());
        match (bytes[i], hex) {
            (b'%', Some(b)) => {
                out.push(b);
                i += 3;
            }
            (b, _) => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
