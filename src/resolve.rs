use std::io::{Error as IoError, ErrorKind as IoErrorKind};
use std::path::{Path, PathBuf};

use mime_guess::MimeGuess;

use crate::cache::{CacheEntry, MetadataCache};
use crate::util::{load_file, resolve_within, FileBody, LoadedFile, ServedFile};
use crate::{EntityTag, ServeError};

/// A file path to try, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    /// Absolute path inside the root.
    pub path: PathBuf,
    /// Whether this is the configured index fallback.
    pub is_index: bool,
}

/// The first candidate that could be served.
#[derive(Debug)]
pub struct Resolved {
    /// Path of the file.
    pub path: PathBuf,
    /// Whether the index fallback was used.
    pub is_index: bool,
    /// Whether the file came from the cache.
    pub from_cache: bool,
    /// The file, ready for the response builder.
    pub file: ServedFile,
}

/// Build the ordered candidate list for a stem capture.
///
/// A non-empty capture is resolved within `root` (skipped if it would escape); when it has no
/// extension, one variant per configured extension follows. A capture ending in `/` names a
/// directory and yields no file candidates. The index path, if any, comes last.
pub fn candidates(
    root: &Path,
    capture: &str,
    extensions: &[String],
    index_path: Option<&Path>,
) -> Vec<Candidate> {
    let mut list = Vec::with_capacity(extensions.len() + 2);
    if !capture.is_empty() && !capture.ends_with('/') {
        match resolve_within(root, capture) {
            Some(path) => {
                if path.extension().is_none() {
                    for ext in extensions {
                        let mut variant = path.clone().into_os_string();
                        variant.push(".");
                        variant.push(ext);
                        list.push(Candidate {
                            path: variant.into(),
                            is_index: false,
                        });
                    }
                }
                list.insert(
                    0,
                    Candidate {
                        path,
                        is_index: false,
                    },
                );
            }
            None => tracing::debug!(capture, "request path escapes the root"),
        }
    }
    if let Some(index_path) = index_path {
        list.push(Candidate {
            path: index_path.to_path_buf(),
            is_index: true,
        });
    }
    list
}

/// Some IO errors only mean the candidate doesn't exist, and the next one should be tried.
fn is_missing(err: &IoError) -> bool {
    matches!(
        err.kind(),
        IoErrorKind::NotFound
            | IoErrorKind::NotADirectory
            | IoErrorKind::InvalidFilename
            | IoErrorKind::IsADirectory
    )
}

/// Walk the candidates and load the first one that exists.
///
/// Cached entries are served from memory. Misses are opened; files within `max_cache` are read,
/// hashed and cached, larger ones are left open for streaming with a weak tag.
///
/// Returns `Ok(None)` when no candidate exists. Any other IO error aborts the walk.
pub async fn resolve_candidates(
    candidates: Vec<Candidate>,
    cache: &MetadataCache,
    max_cache: Option<u64>,
) -> Result<Option<Resolved>, ServeError> {
    for Candidate { path, is_index } in candidates {
        let mime = MimeGuess::from_path(&path).first_or_octet_stream();

        if let Some(entry) = cache.get(&path) {
            tracing::debug!(path = %path.display(), "cache hit");
            return Ok(Some(Resolved {
                path,
                is_index,
                from_cache: true,
                file: ServedFile {
                    size: entry.size,
                    modified: entry.modified,
                    etag: entry.etag,
                    mime,
                    body: FileBody::Buffered(entry.contents),
                },
            }));
        }

        let file = match load_file(path.clone(), max_cache).await {
            Ok(LoadedFile::Buffered { contents, modified }) => {
                let entry = CacheEntry {
                    size: contents.len() as u64,
                    modified,
                    etag: EntityTag::from_sha256(&contents),
                    contents,
                };
                tracing::debug!(path = %path.display(), size = entry.size, "caching file");
                cache.insert(path.clone(), entry.clone());
                ServedFile {
                    size: entry.size,
                    modified: entry.modified,
                    etag: entry.etag,
                    mime,
                    body: FileBody::Buffered(entry.contents),
                }
            }
            Ok(LoadedFile::Streamed {
                file,
                size,
                modified,
            }) => ServedFile {
                size,
                modified,
                etag: EntityTag::from_metadata(size, modified),
                mime,
                body: FileBody::Streamed { file, size },
            },
            Err(err) if is_missing(&err) => {
                tracing::debug!(path = %path.display(), error = %err, "candidate not found");
                continue;
            }
            Err(source) => return Err(ServeError::Io { path, source }),
        };

        return Ok(Some(Resolved {
            path,
            is_index,
            from_cache: false,
            file,
        }));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(list: &[Candidate]) -> Vec<&Path> {
        list.iter().map(|c| c.path.as_path()).collect()
    }

    #[test]
    fn extensions_follow_extensionless_capture() {
        let root = Path::new("/srv/static");
        let exts = vec!["html".to_owned(), "htm".to_owned()];
        let list = candidates(root, "about", &exts, None);
        assert_eq!(
            paths(&list),
            vec![
                Path::new("/srv/static/about"),
                Path::new("/srv/static/about.html"),
                Path::new("/srv/static/about.htm"),
            ]
        );
    }

    #[test]
    fn extensions_are_skipped_when_capture_has_one() {
        let root = Path::new("/srv/static");
        let exts = vec!["html".to_owned()];
        let list = candidates(root, "app.js", &exts, None);
        assert_eq!(paths(&list), vec![Path::new("/srv/static/app.js")]);
    }

    #[test]
    fn index_comes_last() {
        let root = Path::new("/srv/static");
        let index = root.join("index.html");
        let list = candidates(root, "route", &[], Some(&index));
        assert_eq!(list.len(), 2);
        assert!(!list[0].is_index);
        assert!(list[1].is_index);

        let list = candidates(root, "", &[], Some(&index));
        assert_eq!(paths(&list), vec![index.as_path()]);
    }

    #[test]
    fn trailing_slash_yields_only_the_index() {
        let root = Path::new("/srv/static");
        let index = root.join("index.html");
        let exts = vec!["html".to_owned()];
        assert!(candidates(root, "about/", &exts, None).is_empty());
        assert_eq!(
            paths(&candidates(root, "about/", &exts, Some(&index))),
            vec![index.as_path()]
        );
    }

    #[test]
    fn escaping_capture_yields_no_candidate() {
        let root = Path::new("/srv/static");
        assert!(candidates(root, "../etc/passwd", &[], None).is_empty());
    }
}
