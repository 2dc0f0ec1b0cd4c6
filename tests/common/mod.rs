#![allow(dead_code)]

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Hands out at most `max_read` bytes per read, then end-of-stream.
pub struct FragmentedReader {
    data: Vec<u8>,
    pos: usize,
    max_read: usize,
}

impl FragmentedReader {
    pub fn new(data: &[u8], max_read: usize) -> Self {
        assert!(max_read > 0);
        Self {
            data: data.to_vec(),
            pos: 0,
            max_read,
        }
    }
}

impl AsyncRead for FragmentedReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let end = (this.pos + this.max_read)
            .min(this.data.len())
            .min(this.pos + buf.remaining());
        buf.put_slice(&this.data[this.pos..end]);
        this.pos = end;
        Poll::Ready(Ok(()))
    }
}

/// A source whose every read fails with `kind`.
pub struct FailingReader {
    pub kind: io::ErrorKind,
}

impl AsyncRead for FailingReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::from(self.kind)))
    }
}

/// A sink whose every write fails with `kind`.
pub struct FailingWriter {
    pub kind: io::ErrorKind,
}

impl AsyncWrite for FailingWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Err(io::Error::from(self.kind)))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// A sink that takes the first `limit` bytes, then fails every write with
/// `kind`. A single write may be cut short at the limit.
pub struct PartialWriter {
    pub accepted: Vec<u8>,
    limit: usize,
    kind: io::ErrorKind,
}

impl PartialWriter {
    pub fn new(limit: usize, kind: io::ErrorKind) -> Self {
        Self {
            accepted: Vec::new(),
            limit,
            kind,
        }
    }
}

impl AsyncWrite for PartialWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let room = this.limit - this.accepted.len();
        if room == 0 {
            return Poll::Ready(Err(io::Error::from(this.kind)));
        }
        let n = room.min(buf.len());
        this.accepted.extend_from_slice(&buf[..n]);
        Poll::Ready(Ok(n))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
