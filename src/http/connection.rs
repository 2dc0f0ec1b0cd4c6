use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, warn};

use crate::http::parser::{ParseError, request_from_reader_timeout};
use crate::http::request::Request;
use crate::http::response::{StatusCode, default_headers};
use crate::http::writer::{ResponseWriter, WriteError, WriterState};

/// Application logic invoked once per connection with the parsed request.
///
/// The handler must call the writer in a legal order. Returning an error
/// before anything was written makes the connection answer with that
/// error's status and message instead.
pub trait Handler: Send + Sync + 'static {
    fn handle<W>(
        &self,
        writer: &mut ResponseWriter<W>,
        request: &Request,
    ) -> impl Future<Output = Result<(), HandlerError>> + Send
    where
        W: AsyncWrite + Unpin + Send;
}

#[derive(Debug, Error)]
#[error("{} {}: {message}", .status.as_u16(), .status.reason_phrase())]
pub struct HandlerError {
    pub status: StatusCode,
    pub message: String,
}

impl HandlerError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BadRequest, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::InternalServerError, message)
    }

    /// Writes a complete plain-text response carrying this error.
    pub async fn write_to<W>(&self, writer: &mut ResponseWriter<W>) -> Result<(), WriteError>
    where
        W: AsyncWrite + Unpin,
    {
        let body = self.message.as_bytes();
        writer.write_status_line(self.status).await?;
        writer.write_headers(&default_headers(body.len())).await?;
        writer.write_body(body).await?;
        Ok(())
    }
}

impl From<WriteError> for HandlerError {
    fn from(err: WriteError) -> Self {
        HandlerError::internal(err.to_string())
    }
}

/// One accepted client: exactly one request, one response, then close.
pub struct Connection<S> {
    stream: S,
    peer: SocketAddr,
    read_timeout: Option<Duration>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S, peer: SocketAddr, read_timeout: Option<Duration>) -> Self {
        Self {
            stream,
            peer,
            read_timeout,
        }
    }

    pub async fn run<H: Handler>(mut self, handler: &H) -> anyhow::Result<()> {
        let peer = self.peer;

        let request = match request_from_reader_timeout(&mut self.stream, self.read_timeout).await {
            Ok(request) => request,
            Err(ParseError::Io(e)) => return Err(e.into()),
            Err(e) => {
                let status = match e {
                    ParseError::Timeout(_) => StatusCode::Other(408),
                    _ => StatusCode::BadRequest,
                };
                warn!(%peer, status = status.as_u16(), error = %e, "rejecting request");
                let mut writer = ResponseWriter::new(self.stream);
                HandlerError::new(status, e.to_string())
                    .write_to(&mut writer)
                    .await?;
                writer.into_inner().shutdown().await?;
                return Ok(());
            }
        };

        debug!(
            %peer,
            method = request.method(),
            target = request.target(),
            "request parsed"
        );

        let mut writer = ResponseWriter::new(self.stream);
        if let Err(e) = handler.handle(&mut writer, &request).await {
            if writer.state() == WriterState::WritingStatus {
                warn!(%peer, error = %e, "handler failed, sending error response");
                e.write_to(&mut writer).await?;
            } else {
                error!(%peer, error = %e, "handler failed after the response was started");
            }
        }

        writer.into_inner().shutdown().await?;
        Ok(())
    }
}
