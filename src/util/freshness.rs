use http::header::{self, HeaderMap};

use crate::EntityTag;

fn header_str<'a>(headers: &'a HeaderMap, name: header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Whether the client's cached copy is still current, so that a 304 can be sent instead.
///
/// Reads only the request validators and the `ETag`/`Last-Modified` already placed on the
/// response; it must be called after those headers are set.
///
/// - Without `If-None-Match` and `If-Modified-Since` nothing is fresh.
/// - A request `Cache-Control: no-cache` forces a full response.
/// - `If-None-Match` decides alone when present, using weak comparison.
/// - Otherwise `Last-Modified` must not be later than `If-Modified-Since`.
pub fn is_fresh(request: &HeaderMap, response: &HeaderMap) -> bool {
    let if_none_match = header_str(request, header::IF_NONE_MATCH);
    let if_modified_since = header_str(request, header::IF_MODIFIED_SINCE);
    if if_none_match.is_none() && if_modified_since.is_none() {
        return false;
    }

    if let Some(cache_control) = header_str(request, header::CACHE_CONTROL) {
        if cache_control
            .split(',')
            .any(|directive| directive.trim().eq_ignore_ascii_case("no-cache"))
        {
            return false;
        }
    }

    if let Some(if_none_match) = if_none_match {
        if if_none_match.trim() == "*" {
            return true;
        }
        return header_str(response, header::ETAG)
            .and_then(EntityTag::parse)
            .is_some_and(|etag| etag.matches_none_match(if_none_match));
    }

    let last_modified = header_str(response, header::LAST_MODIFIED)
        .and_then(|value| httpdate::parse_http_date(value).ok());
    let since = if_modified_since.and_then(|value| httpdate::parse_http_date(value).ok());
    match (last_modified, since) {
        (Some(last_modified), Some(since)) => last_modified <= since,
        _ => false,
    }
}
