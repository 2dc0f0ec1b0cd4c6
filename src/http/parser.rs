use std::time::Duration;

use bytes::{Buf, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::http::headers::{HeaderError, find_crlf};
use crate::http::request::{ParserState, Request, RequestLine};

const INITIAL_BUFFER_SIZE: usize = 1024;
const SUPPORTED_VERSION: &str = "1.1";
const CRLF_LEN: usize = 2;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid request line: {0}")]
    InvalidRequestLine(String),
    #[error("invalid header: {0}")]
    Header(#[from] HeaderError),
    #[error("invalid content-length: {0:?}")]
    InvalidContentLength(String),
    #[error("body is longer than content-length ({actual} > {expected})")]
    BodyOverflow { expected: usize, actual: usize },
    #[error("body is shorter than content-length ({actual} < {expected})")]
    IncompleteBody { expected: usize, actual: usize },
    #[error("connection closed before the request was complete")]
    IncompleteRequest,
    #[error("request is already fully parsed")]
    AlreadyDone,
    #[error("timed out after {0:?} waiting for the request")]
    Timeout(Duration),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Request {
    /// Feeds buffered bytes to the state machine and returns how many of them
    /// were consumed. Unconsumed bytes must be offered again, with more data
    /// appended, on the next call.
    ///
    /// An empty `data` while the body is still short means the input ended
    /// and fails with [`ParseError::IncompleteBody`].
    pub fn parse(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        if self.is_done() {
            return Err(ParseError::AlreadyDone);
        }
        if data.is_empty() && self.state == ParserState::ParsingBody {
            return self.parse_single(data);
        }

        let mut consumed = 0;
        while !self.is_done() {
            let rest = &data[consumed..];
            // Everything offered so far went into the body; wait for more.
            if rest.is_empty() && self.state == ParserState::ParsingBody {
                break;
            }
            let n = self.parse_single(rest)?;
            if n == 0 {
                break;
            }
            consumed += n;
        }
        Ok(consumed)
    }

    fn parse_single(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        match self.state {
            ParserState::Initialized => {
                let Some((line, n)) = parse_request_line(data)? else {
                    return Ok(0);
                };
                self.request_line = line;
                self.state = ParserState::ParsingHeaders;
                Ok(n)
            }
            ParserState::ParsingHeaders => {
                let mut consumed = 0;
                loop {
                    let (n, done) = self.headers.parse(&data[consumed..])?;
                    if done {
                        consumed += CRLF_LEN;
                        self.state = match self.declared_length()? {
                            0 => ParserState::Done,
                            _ => ParserState::ParsingBody,
                        };
                        return Ok(consumed);
                    }
                    if n == 0 {
                        return Ok(consumed);
                    }
                    consumed += n;
                }
            }
            ParserState::ParsingBody => {
                let expected = self.declared_length()?;
                if data.is_empty() {
                    return Err(ParseError::IncompleteBody {
                        expected,
                        actual: self.body.len(),
                    });
                }

                self.body.extend_from_slice(data);
                let actual = self.body.len();
                if actual > expected {
                    return Err(ParseError::BodyOverflow { expected, actual });
                }
                if actual == expected {
                    self.state = ParserState::Done;
                }
                Ok(data.len())
            }
            ParserState::Done => Err(ParseError::AlreadyDone),
        }
    }

    /// Zero when the header is absent.
    fn declared_length(&self) -> Result<usize, ParseError> {
        match self.headers.get("content-length") {
            None => Ok(0),
            Some(raw) => raw
                .parse()
                .map_err(|_| ParseError::InvalidContentLength(raw.to_string())),
        }
    }
}

/// Returns `None` until a full line is buffered, otherwise the parsed line
/// and the bytes it occupied including its CRLF.
fn parse_request_line(data: &[u8]) -> Result<Option<(RequestLine, usize)>, ParseError> {
    let Some(idx) = find_crlf(data) else {
        return Ok(None);
    };

    let invalid = |reason: &str| ParseError::InvalidRequestLine(reason.to_string());
    let line = std::str::from_utf8(&data[..idx]).map_err(|_| invalid("not valid UTF-8"))?;

    let parts: Vec<&str> = line.split(' ').collect();
    let [method, target, version] = parts[..] else {
        return Err(invalid(&format!("expected 3 parts, got {}: {line:?}", parts.len())));
    };

    if method.is_empty() || !method.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(invalid(&format!("method {method:?}")));
    }
    if target.is_empty() {
        return Err(invalid("empty request target"));
    }
    let version = match version.split_once('/') {
        Some(("HTTP", v)) if v == SUPPORTED_VERSION => v,
        _ => return Err(invalid(&format!("unsupported version {version:?}"))),
    };

    let request_line = RequestLine {
        method: method.to_string(),
        target: target.to_string(),
        version: version.to_string(),
    };
    Ok(Some((request_line, idx + CRLF_LEN)))
}

/// Reads from `reader` until one complete request has been parsed.
///
/// Tolerates reads of any size. Bytes after the end of the request are left
/// unread or discarded; one request per connection.
pub async fn request_from_reader<R>(reader: &mut R) -> Result<Request, ParseError>
where
    R: AsyncRead + Unpin,
{
    let mut request = Request::new();
    let mut buf = BytesMut::with_capacity(INITIAL_BUFFER_SIZE);

    while !request.is_done() {
        if buf.len() == buf.capacity() {
            let grow_by = buf.capacity().max(INITIAL_BUFFER_SIZE);
            buf.reserve(grow_by);
        }

        let n = reader.read_buf(&mut buf).await?;
        if n == 0 {
            if request.state == ParserState::ParsingBody {
                request.parse(&[])?;
            }
            return Err(ParseError::IncompleteRequest);
        }

        let consumed = request.parse(&buf)?;
        buf.advance(consumed);
    }

    Ok(request)
}

/// Like [`request_from_reader`], failing with [`ParseError::Timeout`] if the
/// request is not complete within `limit`. `None` waits forever.
pub async fn request_from_reader_timeout<R>(
    reader: &mut R,
    limit: Option<Duration>,
) -> Result<Request, ParseError>
where
    R: AsyncRead + Unpin,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, request_from_reader(reader))
            .await
            .map_err(|_| ParseError::Timeout(limit))?,
        None => request_from_reader(reader).await,
    }
}
