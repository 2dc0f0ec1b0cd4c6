//! Case-insensitive header map shared by requests (input) and responses
//! (output headers and trailers).
//!
//! Names are normalized to lowercase on every insert and lookup. A repeated
//! field name overwrites the earlier value; values are never joined.

use indexmap::IndexMap;
use thiserror::Error;

const CRLF: &[u8] = b"\r\n";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("whitespace between header name and colon: {0:?}")]
    SpaceBeforeColon(String),
    #[error("header line has no colon: {0:?}")]
    MissingColon(String),
    #[error("invalid character in header name: {0:?}")]
    InvalidName(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: IndexMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses at most one `name: value` line from the front of `data`.
    ///
    /// Returns `(consumed, done)`. `(0, false)` means no full line is
    /// buffered yet. `(0, true)` means `data` starts with the blank line that
    /// ends the header section; the caller accounts for those two bytes.
    pub fn parse(&mut self, data: &[u8]) -> Result<(usize, bool), HeaderError> {
        let Some(idx) = find_crlf(data) else {
            return Ok((0, false));
        };
        if idx == 0 {
            return Ok((0, true));
        }

        let line = &data[..idx];
        let colon = line
            .iter()
            .position(|&b| b == b':')
            .ok_or_else(|| HeaderError::MissingColon(String::from_utf8_lossy(line).into_owned()))?;

        let raw_name = &line[..colon];
        if raw_name.last().is_some_and(|b| b.is_ascii_whitespace()) {
            return Err(HeaderError::SpaceBeforeColon(
                String::from_utf8_lossy(raw_name).into_owned(),
            ));
        }

        let name = raw_name.trim_ascii();
        if name.is_empty() || !name.iter().all(|&b| is_token_char(b)) {
            return Err(HeaderError::InvalidName(
                String::from_utf8_lossy(raw_name).into_owned(),
            ));
        }

        // Values may carry obs-text bytes; those that are not UTF-8 become
        // U+FFFD rather than failing the request.
        let value = String::from_utf8_lossy(line[colon + 1..].trim_ascii());

        // Token chars are ASCII, so the conversion is exact.
        let name = String::from_utf8_lossy(name);
        self.set(&name, value);

        Ok((idx + CRLF.len(), false))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.fields.shift_remove(&name.to_ascii_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates in insertion order, which is also the order they are written.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serializes every field as `name: value\r\n`, without the terminating
    /// blank line.
    pub(crate) fn to_wire(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for (name, value) in self.iter() {
            buf.extend_from_slice(name.as_bytes());
            buf.extend_from_slice(b": ");
            buf.extend_from_slice(value.as_bytes());
            buf.extend_from_slice(CRLF);
        }
        buf
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.set(name.as_ref(), value);
        }
        headers
    }
}

pub(crate) fn find_crlf(data: &[u8]) -> Option<usize> {
    data.windows(CRLF.len()).position(|w| w == CRLF)
}

fn is_token_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}
