use std::io;

use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::headers::Headers;
use crate::http::response::StatusCode;

const HTTP_VERSION: &str = "HTTP/1.1";
const CRLF: &[u8] = b"\r\n";
const LAST_CHUNK: &[u8] = b"0\r\n";

/// Which part of the response the writer accepts next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WriterState {
    WritingStatus,
    WritingHeaders,
    WritingBody,
    WritingTrailers,
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("out of order write: expected {expected:?}, writer is in {actual:?}")]
    OutOfOrder {
        expected: WriterState,
        actual: WriterState,
    },
    /// The sink failed after accepting `written` bytes of the current call.
    #[error("write failed after {written} bytes: {source}")]
    Io {
        written: usize,
        #[source]
        source: io::Error,
    },
}

/// Streams a response straight to the underlying sink.
///
/// Every call writes and flushes its bytes before returning; nothing is held
/// back until the end of the response. Legal call orders are
/// status line, headers, body (any number of times), or
/// status line, headers, chunks, last chunk, trailers.
pub struct ResponseWriter<W> {
    inner: W,
    state: WriterState,
}

impl<W> ResponseWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            state: WriterState::WritingStatus,
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub async fn write_status_line(&mut self, status: StatusCode) -> Result<(), WriteError> {
        self.expect(WriterState::WritingStatus)?;
        let line = format!(
            "{} {} {}\r\n",
            HTTP_VERSION,
            status.as_u16(),
            status.reason_phrase()
        );
        self.send(line.as_bytes()).await?;
        self.state = WriterState::WritingHeaders;
        Ok(())
    }

    pub async fn write_headers(&mut self, headers: &Headers) -> Result<(), WriteError> {
        self.expect(WriterState::WritingHeaders)?;
        self.write_field_section(headers).await?;
        self.state = WriterState::WritingBody;
        Ok(())
    }

    /// Writes `body` verbatim. May be called repeatedly.
    pub async fn write_body(&mut self, body: &[u8]) -> Result<usize, WriteError> {
        self.expect(WriterState::WritingBody)?;
        self.send(body).await
    }

    /// Writes one chunk frame (`HEXLEN\r\n<data>\r\n`) and returns the size
    /// of the frame. An empty `data` writes nothing, since a zero-length
    /// frame would end the body.
    pub async fn write_chunked_body(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        self.expect(WriterState::WritingBody)?;
        if data.is_empty() {
            return Ok(0);
        }

        let size_line = format!("{:x}\r\n", data.len());
        let mut frame = Vec::with_capacity(size_line.len() + data.len() + CRLF.len());
        frame.extend_from_slice(size_line.as_bytes());
        frame.extend_from_slice(data);
        frame.extend_from_slice(CRLF);

        self.send(&frame).await
    }

    /// Writes the zero-length last chunk. Trailers (possibly none) must
    /// follow to finish the message.
    pub async fn write_chunked_body_done(&mut self) -> Result<usize, WriteError> {
        self.expect(WriterState::WritingBody)?;
        let n = self.send(LAST_CHUNK).await?;
        self.state = WriterState::WritingTrailers;
        Ok(n)
    }

    pub async fn write_trailers(&mut self, trailers: &Headers) -> Result<(), WriteError> {
        self.expect(WriterState::WritingTrailers)?;
        self.write_field_section(trailers).await
    }

    async fn write_field_section(&mut self, fields: &Headers) -> Result<(), WriteError> {
        let mut section = fields.to_wire();
        section.extend_from_slice(CRLF);
        self.send(&section).await?;
        Ok(())
    }

    fn expect(&self, expected: WriterState) -> Result<(), WriteError> {
        if self.state != expected {
            return Err(WriteError::OutOfOrder {
                expected,
                actual: self.state,
            });
        }
        Ok(())
    }

    /// Writes all of `bytes` and flushes. A failure reports how many bytes
    /// the sink took before it gave up.
    async fn send(&mut self, bytes: &[u8]) -> Result<usize, WriteError> {
        let mut written = 0;
        while written < bytes.len() {
            let n = match self.inner.write(&bytes[written..]).await {
                Ok(0) => {
                    return Err(WriteError::Io {
                        written,
                        source: io::Error::new(
                            io::ErrorKind::WriteZero,
                            "connection closed while writing",
                        ),
                    });
                }
                Ok(n) => n,
                Err(source) => return Err(WriteError::Io { written, source }),
            };
            written += n;
        }
        self.inner
            .flush()
            .await
            .map_err(|source| WriteError::Io { written, source })?;
        Ok(written)
    }
}
