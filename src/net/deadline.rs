//! Per-request deadline on receiving an HTTP/1 request head.
//!
//! hyper's `header_read_timeout` runs from the moment a connection starts
//! waiting for the next request, so it doubles as the keep-alive idle bound.
//! `HeadDeadline` adds the tighter bound: once the first byte of a head
//! arrives, the rest of the head must arrive within the read timeout.
//!
//! # Phases
//! ```text
//! AwaitingHead --first non-blank byte--> InHead --blank line--> PastHead
//!      ^                                                            |
//!      +----------------------- response write ---------------------+
//! ```

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::time::{Instant, Sleep};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitingHead,
    InHead,
    PastHead,
}

/// Stream wrapper that fails reads when a request head stalls.
pub struct HeadDeadline<S> {
    inner: S,
    limit: Duration,
    phase: Phase,
    sleep: Pin<Box<Sleep>>,
    at_line_start: bool,
}

impl<S> HeadDeadline<S> {
    /// Must be called inside a Tokio runtime.
    pub fn new(inner: S, limit: Duration) -> Self {
        Self {
            inner,
            limit,
            phase: Phase::AwaitingHead,
            sleep: Box::pin(tokio::time::sleep(limit)),
            at_line_start: true,
        }
    }

    fn observe(&mut self, byte: u8) {
        match self.phase {
            // Stray CRLF between requests does not start a head
            Phase::AwaitingHead if byte == b'\r' || byte == b'\n' => {}
            Phase::AwaitingHead => {
                self.phase = Phase::InHead;
                self.at_line_start = false;
                self.sleep.as_mut().reset(Instant::now() + self.limit);
            }
            Phase::InHead => match byte {
                b'\r' => {}
                b'\n' if self.at_line_start => self.phase = Phase::PastHead,
                b'\n' => self.at_line_start = true,
                _ => self.at_line_start = false,
            },
            Phase::PastHead => {}
        }
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for HeadDeadline<S> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = &mut *self;
        if this.phase == Phase::InHead && this.sleep.as_mut().poll(cx).is_ready() {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "request head not received in time",
            )));
        }

        let before = buf.filled().len();
        ready!(Pin::new(&mut this.inner).poll_read(cx, buf))?;
        for &byte in &buf.filled()[before..] {
            this.observe(byte);
        }
        Poll::Ready(Ok(()))
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for HeadDeadline<S> {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.phase = Phase::AwaitingHead;
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_write_vectored(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        self.phase = Phase::AwaitingHead;
        Pin::new(&mut self.inner).poll_write_vectored(cx, bufs)
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}
