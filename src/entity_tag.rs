use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use md5::Md5;
use sha2::{Digest, Sha256};

/// A content-identity token, as sent in the `ETag` header.
///
/// Only the opaque part (between the quotes) is stored.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntityTag {
    /// Derived from the file contents. Byte-for-byte identity.
    Strong(String),
    /// Derived from file metadata only.
    Weak(String),
}

impl EntityTag {
    /// Strong tag from the SHA-256 of the contents: `"<size-hex>-<base64 digest>"`.
    pub fn from_sha256(contents: &[u8]) -> Self {
        Self::from_digest(contents.len() as u64, &Sha256::digest(contents))
    }

    /// Strong tag from the MD5 of the contents: `"<size-hex>-<base64 digest>"`.
    ///
    /// Cheaper than `from_sha256`; meant for a handful of known files loaded at startup.
    pub fn from_md5(contents: &[u8]) -> Self {
        Self::from_digest(contents.len() as u64, &Md5::digest(contents))
    }

    fn from_digest(size: u64, digest: &[u8]) -> Self {
        EntityTag::Strong(format!("{:x}-{}", size, STANDARD_NO_PAD.encode(digest)))
    }

    /// Weak tag from size and modification time: `W/"<size-hex>-<mtime-millis-hex>"`.
    ///
    /// Never reads the file body.
    pub fn from_metadata(size: u64, modified: Option<SystemTime>) -> Self {
        let millis = modified
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |elapsed| elapsed.as_millis());
        EntityTag::Weak(format!("{:x}-{:x}", size, millis))
    }

    /// Parse a single entity tag as found in `ETag` or in an `If-None-Match` list.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let (weak, quoted) = match value.strip_prefix("W/") {
            Some(rest) => (true, rest),
            None => (false, value),
        };
        let opaque = quoted.strip_prefix('"')?.strip_suffix('"')?;
        if opaque.contains('"') {
            return None;
        }
        Some(if weak {
            EntityTag::Weak(opaque.to_owned())
        } else {
            EntityTag::Strong(opaque.to_owned())
        })
    }

    /// Whether this is a weak tag.
    pub fn is_weak(&self) -> bool {
        matches!(*self, EntityTag::Weak(_))
    }

    /// The opaque part of the tag, without quotes or weakness indicator.
    pub fn opaque(&self) -> &str {
        match *self {
            EntityTag::Strong(ref tag) | EntityTag::Weak(ref tag) => tag,
        }
    }

    /// Weak comparison: the opaque parts are equal, regardless of weakness.
    ///
    /// This is the comparison `If-None-Match` uses.
    pub fn weak_eq(&self, other: &EntityTag) -> bool {
        self.opaque() == other.opaque()
    }

    /// Whether a comma-separated `If-None-Match` value names this tag.
    ///
    /// `*` matches any tag. Unparseable members are ignored.
    pub fn matches_none_match(&self, if_none_match: &str) -> bool {
        if if_none_match.trim() == "*" {
            return true;
        }
        if_none_match
            .split(',')
            .filter_map(EntityTag::parse)
            .any(|candidate| candidate.weak_eq(self))
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            EntityTag::Strong(ref tag) => write!(f, "\"{}\"", tag),
            EntityTag::Weak(ref tag) => write!(f, "W/\"{}\"", tag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn strong_sha256_tag_has_size_and_unpadded_digest() {
        let tag = EntityTag::from_sha256(b"hello");
        // sha256("hello") in base64 is LPJNul+wow4m6DsqxbninhsWHlwfp0JecwQzYpOLmCQ=
        assert_eq!(
            tag.to_string(),
            "\"5-LPJNul+wow4m6DsqxbninhsWHlwfp0JecwQzYpOLmCQ\""
        );
        assert!(!tag.is_weak());
    }

    #[test]
    fn strong_md5_tag_has_size_and_unpadded_digest() {
        let tag = EntityTag::from_md5(b"hello");
        // md5("hello") in base64 is XUFAKrxLKna5cZ2REBfFkg==
        assert_eq!(tag.to_string(), "\"5-XUFAKrxLKna5cZ2REBfFkg\"");
    }

    #[test]
    fn weak_tag_uses_size_and_mtime_millis() {
        let modified = UNIX_EPOCH + Duration::from_millis(0x1234_5678);
        let tag = EntityTag::from_metadata(0x2000, Some(modified));
        assert_eq!(tag.to_string(), "W/\"2000-12345678\"");
        assert!(tag.is_weak());
    }

    #[test]
    fn parses_strong_and_weak_tags() {
        assert_eq!(
            EntityTag::parse("\"abc\""),
            Some(EntityTag::Strong("abc".into()))
        );
        assert_eq!(
            EntityTag::parse(" W/\"abc\" "),
            Some(EntityTag::Weak("abc".into()))
        );
        assert_eq!(EntityTag::parse("abc"), None);
        assert_eq!(EntityTag::parse("\"a\"b\""), None);
    }

    #[test]
    fn comparisons() {
        let strong = EntityTag::Strong("x".into());
        let weak = EntityTag::Weak("x".into());
        assert!(strong.weak_eq(&weak));
        assert!(!weak.weak_eq(&EntityTag::Weak("y".into())));
    }

    #[test]
    fn matches_if_none_match_lists() {
        let tag = EntityTag::Weak("1-2".into());
        assert!(tag.matches_none_match("\"1-2\""));
        assert!(tag.matches_none_match("\"a\", W/\"1-2\""));
        assert!(tag.matches_none_match("*"));
        assert!(!tag.matches_none_match("\"1-3\""));
    }
}
