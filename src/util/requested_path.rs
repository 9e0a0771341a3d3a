use std::io::Error as IoError;
use std::path::{Component, Path, PathBuf};

#[inline]
fn decode_percents(string: &str) -> String {
    percent_encoding::percent_decode_str(string)
        .decode_utf8_lossy()
        .into_owned()
}

/// Percent-decode a request path.
///
/// Everything downstream (hidden check, stemming, resolution) works on the decoded form, so an
/// encoded dot or slash is treated the same as a literal one.
pub fn decode_request_path(request_path: &str) -> String {
    decode_percents(request_path)
}

/// Make `base` absolute against the working directory and lexically normalize it.
///
/// Symlinks are not resolved.
pub fn normalize_root(base: &Path) -> Result<PathBuf, IoError> {
    let absolute = if base.is_absolute() {
        base.to_path_buf()
    } else {
        std::env::current_dir()?.join(base)
    };
    Ok(absolute
        .components()
        .fold(PathBuf::new(), |mut result, component| {
            match component {
                Component::ParentDir => {
                    result.pop();
                }
                Component::CurDir => {}
                other => result.push(other),
            }
            result
        }))
}

/// Join a relative request path onto `root`.
///
/// Returns `None` for anything that would land outside of `root`: absolute paths, drive
/// prefixes, NUL bytes, or `..` segments that climb above the root.
pub fn resolve_within(root: &Path, relative: &str) -> Option<PathBuf> {
    if relative.contains('\0') {
        return None;
    }

    let mut result = root.to_path_buf();
    let mut depth = 0usize;
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(x) => {
                // Parse again to catch a component that smuggles in a Windows drive letter,
                // e.g.: `/anypath/c:/windows/win.ini`
                if !Path::new(x)
                    .components()
                    .all(|c| matches!(c, Component::Normal(_)))
                {
                    return None;
                }
                result.push(x);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                result.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(result)
}

/// Find the segment that makes `request_path` hidden, walking from the leaf towards the root.
///
/// A segment is hidden when it starts with a dot, except for `.well-known`.
pub fn hidden_segment(request_path: &str) -> Option<&str> {
    request_path
        .split('/')
        .rev()
        .find(|segment| segment.starts_with('.') && *segment != ".well-known")
}

/// URL prefix stripped from request paths before they are resolved against the root.
#[derive(Clone, Debug)]
pub struct Stem {
    prefix: Option<String>,
}

impl Stem {
    /// An empty stem or `/` matches every absolute path.
    pub fn new(stem: &str) -> Self {
        let trimmed = stem.trim_end_matches('/');
        Stem {
            prefix: if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            },
        }
    }

    /// Strip the stem, returning the remainder without its leading slash.
    ///
    /// The stem only matches on a segment boundary: `/static` matches `/static` and
    /// `/static/app.js`, but not `/staticfoo`.
    pub fn capture<'p>(&self, request_path: &'p str) -> Option<&'p str> {
        match self.prefix {
            None => request_path.strip_prefix('/'),
            Some(ref prefix) => {
                let rest = request_path.strip_prefix(prefix.as_str())?;
                if rest.is_empty() {
                    Some(rest)
                } else {
                    rest.strip_prefix('/')
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_stem_captures_everything_after_slash() {
        let stem = Stem::new("");
        assert_eq!(stem.capture("/"), Some(""));
        assert_eq!(stem.capture("/app.js"), Some("app.js"));
        assert_eq!(stem.capture("/a/b.css"), Some("a/b.css"));
        assert_eq!(stem.capture("app.js"), None);
        assert_eq!(Stem::new("/").capture("/x"), Some("x"));
    }

    #[test]
    fn prefixed_stem_matches_on_segment_boundary() {
        let stem = Stem::new("/static");
        assert_eq!(stem.capture("/static"), Some(""));
        assert_eq!(stem.capture("/static/"), Some(""));
        assert_eq!(stem.capture("/static/app.js"), Some("app.js"));
        assert_eq!(stem.capture("/staticfoo"), None);
        assert_eq!(stem.capture("/other/app.js"), None);
    }

    #[test]
    fn trailing_slash_on_stem_is_ignored() {
        let stem = Stem::new("/assets/");
        assert_eq!(stem.capture("/assets/logo.png"), Some("logo.png"));
    }

    #[test]
    fn hidden_segments_are_found() {
        assert_eq!(hidden_segment("/.env"), Some(".env"));
        assert_eq!(hidden_segment("/a/.git/config"), Some(".git"));
        assert_eq!(hidden_segment("/a/../b"), Some(".."));
        assert_eq!(hidden_segment("/.well-known/security.txt"), None);
        assert_eq!(hidden_segment("/a/b.c/d"), None);
        assert_eq!(hidden_segment("/"), None);
    }

    #[test]
    fn resolves_inside_root() {
        let root = Path::new("/srv/static");
        assert_eq!(
            resolve_within(root, "app.js"),
            Some(PathBuf::from("/srv/static/app.js"))
        );
        assert_eq!(
            resolve_within(root, "a/./b/../c.txt"),
            Some(PathBuf::from("/srv/static/a/c.txt"))
        );
    }

    #[test]
    fn refuses_to_escape_root() {
        let root = Path::new("/srv/static");
        assert_eq!(resolve_within(root, "../etc/passwd"), None);
        assert_eq!(resolve_within(root, "a/../../etc/passwd"), None);
        assert_eq!(resolve_within(root, "/etc/passwd"), None);
        assert_eq!(resolve_within(root, "a\0b"), None);
    }

    #[test]
    fn decodes_percent_notation() {
        assert_eq!(decode_request_path("/has%20space.html"), "/has space.html");
        assert_eq!(decode_request_path("/%2e%2e%2fx"), "/../x");
    }

    #[test]
    fn normalizes_root_lexically() {
        let root = normalize_root(Path::new("/srv/./static/../public")).unwrap();
        assert_eq!(root, PathBuf::from("/srv/public"));
        assert!(normalize_root(Path::new("relative")).unwrap().is_absolute());
    }
}
