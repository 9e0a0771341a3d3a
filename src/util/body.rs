use hyper::body::Bytes;
use tokio::fs::File;

use crate::util::FileBytesStream;

/// Response body of a served file.
///
/// Small files are served from memory; large files are streamed from a handle that was opened
/// for this request alone.
#[derive(Debug)]
pub enum FileBody {
    /// Complete file contents, usually shared with the cache.
    Buffered(Bytes),
    /// An open file, streamed in chunks and closed when the stream is dropped.
    ///
    /// At most `size` bytes are sent, matching the `Content-Length` taken at open time.
    Streamed {
        /// Open file handle.
        file: File,
        /// Size in bytes at open time.
        size: u64,
    },
}

impl From<FileBody> for hyper::Body {
    fn from(body: FileBody) -> Self {
        match body {
            FileBody::Buffered(bytes) => hyper::Body::from(bytes),
            FileBody::Streamed { file, size } => {
                hyper::Body::wrap_stream(FileBytesStream::new_with_limit(file, size))
            }
        }
    }
}
