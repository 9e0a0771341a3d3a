use std::{
    fs::OpenOptions,
    io::{Error, ErrorKind, Read},
    path::PathBuf,
    time::SystemTime,
};

use hyper::body::Bytes;
use tokio::{fs::File, task::spawn_blocking};

#[cfg(windows)]
use std::os::windows::fs::OpenOptionsExt;
#[cfg(windows)]
use winapi::um::winbase::FILE_FLAG_BACKUP_SEMANTICS;

/// A file opened for serving, either read into memory or left open for streaming.
#[derive(Debug)]
pub enum LoadedFile {
    /// The file fit the cache threshold and was read completely. The handle is already closed.
    Buffered {
        /// File contents.
        contents: Bytes,
        /// Last modification time.
        modified: Option<SystemTime>,
    },
    /// The file is too large to buffer. Ownership of the open handle moves to the caller.
    Streamed {
        /// Open file handle.
        file: File,
        /// Size in bytes at open time.
        size: u64,
        /// Last modification time.
        modified: Option<SystemTime>,
    },
}

/// Open a file, stat it, and read it into memory when its size is within `max_cache`.
///
/// A `max_cache` of `None` never buffers. Directories fail with `ErrorKind::IsADirectory`.
///
/// Open, stat and read happen in one `spawn_blocking` call. If any step fails, the handle is
/// dropped (and thereby closed) before the error is returned.
pub async fn load_file(path: PathBuf, max_cache: Option<u64>) -> Result<LoadedFile, Error> {
    let task = spawn_blocking(move || {
        let mut opts = OpenOptions::new();
        opts.read(true);

        // On Windows, we need to set this flag to be able to open directories.
        #[cfg(windows)]
        opts.custom_flags(FILE_FLAG_BACKUP_SEMANTICS);

        let mut handle = opts.open(&path)?;
        let metadata = handle.metadata()?;
        if metadata.is_dir() {
            return Err(Error::new(ErrorKind::IsADirectory, "is a directory"));
        }

        let size = metadata.len();
        let modified = metadata.modified().ok();
        match max_cache {
            Some(max) if size <= max => {
                let mut contents = Vec::with_capacity(size as usize);
                handle.read_to_end(&mut contents)?;
                Ok(LoadedFile::Buffered {
                    contents: contents.into(),
                    modified,
                })
            }
            _ => Ok(LoadedFile::Streamed {
                file: File::from_std(handle),
                size,
                modified,
            }),
        }
    });

    // The task produces a result, but so does the `JoinHandle`. Map the join failure to an IO
    // error so both flatten into one.
    match task.await {
        Ok(res) => res,
        Err(err) => {
            tracing::warn!(error = %err, "file loading task failed");
            Err(Error::new(ErrorKind::Other, "background task failed"))
        }
    }
}
