use std::{
    cmp::min,
    io::Error as IoError,
    pin::Pin,
    task::{Context, Poll},
};

use futures_util::stream::Stream;
use hyper::body::Bytes;
use tokio::{
    fs::File,
    io::{AsyncRead, ReadBuf},
};

const BUF_SIZE: usize = 8 * 1024;

/// Wraps an `AsyncRead`, like a tokio `File`, and implements a stream of `Bytes`s.
///
/// The reader is owned by the stream, so it is closed exactly once: when the stream is dropped,
/// whether the body completed, failed, or the connection went away.
pub struct FileBytesStream<F = File> {
    file: F,
    buf: Box<[u8]>,
    remaining: u64,
    sent: u64,
}

impl<F> FileBytesStream<F> {
    /// Create a new stream from the given file.
    pub fn new(file: F) -> Self {
        Self::new_with_limit(file, u64::MAX)
    }

    /// Create a new stream from the given file, reading up to `limit` bytes.
    ///
    /// Data appended to the file after `limit` was taken is not sent.
    pub fn new_with_limit(file: F, limit: u64) -> Self {
        Self {
            file,
            buf: vec![0; BUF_SIZE].into_boxed_slice(),
            remaining: limit,
            sent: 0,
        }
    }
}

impl<F> Stream for FileBytesStream<F>
where
    F: AsyncRead + Unpin,
{
    type Item = Result<Bytes, IoError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let Self {
            ref mut file,
            ref mut buf,
            ref mut remaining,
            ref mut sent,
        } = *self;

        let max_read_length = min(*remaining, buf.len() as u64) as usize;
        if max_read_length == 0 {
            return Poll::Ready(None);
        }
        let mut read_buf = ReadBuf::new(&mut buf[..max_read_length]);
        match Pin::new(file).poll_read(cx, &mut read_buf) {
            Poll::Ready(Ok(())) => {
                let filled = read_buf.filled();
                if filled.is_empty() {
                    Poll::Ready(None)
                } else {
                    *remaining -= filled.len() as u64;
                    *sent += filled.len() as u64;
                    Poll::Ready(Some(Ok(Bytes::copy_from_slice(filled))))
                }
            }
            Poll::Ready(Err(err)) => {
                tracing::warn!(error = %err, bytes_sent = *sent, "file stream aborted");
                Poll::Ready(Some(Err(err)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
