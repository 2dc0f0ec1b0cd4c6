//! Demo routes served by the `httpfromtcp` binary.
//!
//! - `/yourproblem`: 400 page
//! - `/myproblem`: 500 page
//! - `/echo[?chunk=N]`: the request body streamed back with chunked
//!   transfer encoding, followed by `x-content-sha256` and
//!   `x-content-length` trailers
//! - anything else: 200 page

use sha2::{Digest, Sha256};
use tokio::io::AsyncWrite;
use url::Url;

use crate::http::connection::{Handler, HandlerError};
use crate::http::request::Request;
use crate::http::response::{StatusCode, default_headers, default_trailers};
use crate::http::writer::ResponseWriter;

pub const DEFAULT_CHUNK_SIZE: usize = 32;

const BAD_REQUEST_PAGE: &str = "<html>
  <head><title>400 Bad Request</title></head>
  <body><h1>Bad Request</h1><p>The server could not make sense of that request.</p></body>
</html>
";

const SERVER_ERROR_PAGE: &str = "<html>
  <head><title>500 Internal Server Error</title></head>
  <body><h1>Internal Server Error</h1><p>Something went wrong on our side.</p></body>
</html>
";

const OK_PAGE: &str = "<html>
  <head><title>200 OK</title></head>
  <body><h1>Success!</h1><p>Request received.</p></body>
</html>
";

#[derive(Debug, Clone)]
pub struct DemoHandler {
    pub chunk_size: usize,
}

impl Default for DemoHandler {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Handler for DemoHandler {
    async fn handle<W>(
        &self,
        writer: &mut ResponseWriter<W>,
        request: &Request,
    ) -> Result<(), HandlerError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let url = resolve_target(request.target())?;

        match url.path() {
            "/yourproblem" => write_html(writer, StatusCode::BadRequest, BAD_REQUEST_PAGE).await,
            "/myproblem" => {
                write_html(writer, StatusCode::InternalServerError, SERVER_ERROR_PAGE).await
            }
            "/echo" => {
                let chunk_size = chunk_size_param(&url)?.unwrap_or(self.chunk_size);
                echo_chunked(writer, request, chunk_size).await
            }
            _ => write_html(writer, StatusCode::Ok, OK_PAGE).await,
        }
    }
}

/// Origin-form targets are resolved against a dummy base so path and query
/// can be read uniformly.
fn resolve_target(target: &str) -> Result<Url, HandlerError> {
    let base = Url::parse("http://localhost/").map_err(|e| HandlerError::internal(e.to_string()))?;
    base.join(target)
        .map_err(|e| HandlerError::bad_request(format!("bad request target {target:?}: {e}")))
}

fn chunk_size_param(url: &Url) -> Result<Option<usize>, HandlerError> {
    let Some((_, raw)) = url.query_pairs().find(|(k, _)| k == "chunk") else {
        return Ok(None);
    };
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(HandlerError::bad_request(format!(
            "chunk must be a positive integer, got {raw:?}"
        ))),
    }
}

async fn write_html<W>(
    writer: &mut ResponseWriter<W>,
    status: StatusCode,
    page: &str,
) -> Result<(), HandlerError>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut headers = default_headers(page.len());
    headers.set("content-type", "text/html");

    writer.write_status_line(status).await?;
    writer.write_headers(&headers).await?;
    writer.write_body(page.as_bytes()).await?;
    Ok(())
}

async fn echo_chunked<W>(
    writer: &mut ResponseWriter<W>,
    request: &Request,
    chunk_size: usize,
) -> Result<(), HandlerError>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut headers = default_headers(0);
    headers.remove("content-length");
    headers.set("transfer-encoding", "chunked");
    headers.set("trailer", "x-content-sha256, x-content-length");
    headers.set(
        "content-type",
        request
            .header("content-type")
            .unwrap_or("application/octet-stream"),
    );

    writer.write_status_line(StatusCode::Ok).await?;
    writer.write_headers(&headers).await?;

    let mut hasher = Sha256::new();
    for piece in request.body.chunks(chunk_size) {
        hasher.update(piece);
        writer.write_chunked_body(piece).await?;
    }
    writer.write_chunked_body_done().await?;

    let mut trailers = default_trailers();
    trailers.set("x-content-sha256", format!("{:x}", hasher.finalize()));
    trailers.set("x-content-length", request.body.len().to_string());
    writer.write_trailers(&trailers).await?;
    Ok(())
}
