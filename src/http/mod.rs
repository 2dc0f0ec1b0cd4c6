//! HTTP/1.1 protocol implementation.
//!
//! One request and one response per connection; no keep-alive.
//!
//! # Architecture
//!
//! - **`headers`**: case-insensitive header map and the single-line header parser
//! - **`request`**: the parsed request and its parser state
//! - **`parser`**: incremental request state machine driven by socket reads
//! - **`response`**: status codes and default response headers
//! - **`writer`**: ordered, unbuffered response writer with chunked framing
//! - **`connection`**: the per-connection lifecycle and the [`Handler`](connection::Handler) contract
//!
//! # Parser State Machine
//!
//! ```text
//!        ┌─────────────────┐
//!        │   Initialized   │ ← Wait for "METHOD SP TARGET SP HTTP/1.1\r\n"
//!        └───────┬─────────┘
//!                │ Request line parsed
//!                ▼
//!        ┌─────────────────┐
//!        │ ParsingHeaders  │ ← One "name: value\r\n" at a time
//!        └───────┬─────────┘
//!                │ Blank line
//!                ├─ content-length absent or 0 → Done
//!                ▼
//!        ┌─────────────────┐
//!        │   ParsingBody   │ ← Until content-length bytes arrived
//!        └───────┬─────────┘
//!                ▼
//!              Done
//! ```
//!
//! # Writer State Machine
//!
//! ```text
//! WritingStatus → WritingHeaders → WritingBody ─┬─ body bytes (repeatable)
//!                                               └─ chunks → last chunk → WritingTrailers
//! ```
//!
//! # Example
//!
//! ```ignore
//! use httpfromtcp::http::parser::request_from_reader;
//! use httpfromtcp::http::response::{StatusCode, default_headers};
//! use httpfromtcp::http::writer::ResponseWriter;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:42069").await?;
//!     let (mut socket, _addr) = listener.accept().await?;
//!
//!     let request = request_from_reader(&mut socket).await?;
//!     let mut writer = ResponseWriter::new(socket);
//!     writer.write_status_line(StatusCode::Ok).await?;
//!     writer.write_headers(&default_headers(request.body.len())).await?;
//!     writer.write_body(&request.body).await?;
//!     Ok(())
//! }
//! ```

pub mod connection;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
