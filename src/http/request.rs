use crate::http::headers::Headers;

/// The first line of a request: `METHOD SP TARGET SP HTTP/VERSION`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLine {
    /// Uppercase ASCII letters only (e.g. "GET")
    pub method: String,
    /// Request target as sent (e.g. "/search?q=rust")
    pub target: String,
    /// Version without the `HTTP/` prefix; always "1.1" once parsed
    pub version: String,
}

/// Progress of a [`Request`] through the parser.
///
/// States only move forward. `ParsingBody` is skipped when the request has
/// no `content-length` or a length of zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParserState {
    #[default]
    Initialized,
    ParsingHeaders,
    ParsingBody,
    Done,
}

/// A request as produced by the parser.
///
/// Built in place while bytes arrive, see
/// [`request_from_reader`](crate::http::parser::request_from_reader). Treat it
/// as read-only once [`is_done`](Request::is_done) is true.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub request_line: RequestLine,
    pub headers: Headers,
    pub body: Vec<u8>,
    pub(crate) state: ParserState,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(&self) -> &str {
        &self.request_line.method
    }

    pub fn target(&self) -> &str {
        &self.request_line.target
    }

    /// Looks up a header by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// The declared body length. `None` when the header is missing or not a
    /// non-negative integer.
    pub fn content_length(&self) -> Option<usize> {
        self.header("content-length")?.parse().ok()
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }
}
