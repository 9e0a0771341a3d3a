//! `Accept*` header matching.
//!
//! A missing header accepts everything. Otherwise the most specific matching entry decides, and
//! an entry with `q=0` refuses.

use http::header::{HeaderMap, HeaderName};
use mime_guess::Mime;

#[derive(Debug, PartialEq)]
struct Entry<'a> {
    value: &'a str,
    quality: f32,
}

fn parse_quality(params: &str) -> f32 {
    params
        .split(';')
        .filter_map(|param| {
            let (key, value) = param.split_once('=')?;
            if key.trim().eq_ignore_ascii_case("q") {
                value.trim().parse::<f32>().ok()
            } else {
                None
            }
        })
        .next()
        .unwrap_or(1.0)
}

/// Parse all occurrences of a list header. `None` if the header is absent.
fn parse_list<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<Vec<Entry<'a>>> {
    let mut values = headers.get_all(name).iter().peekable();
    values.peek()?;

    Some(
        values
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .filter_map(|item| {
                let (value, params) = match item.split_once(';') {
                    Some((value, params)) => (value, params),
                    None => (item, ""),
                };
                let value = value.trim();
                if value.is_empty() {
                    None
                } else {
                    Some(Entry {
                        value,
                        quality: parse_quality(params),
                    })
                }
            })
            .collect(),
    )
}

/// Quality of the most specific entry, as scored by `specificity`.
fn best_quality<F>(entries: &[Entry<'_>], specificity: F) -> Option<f32>
where
    F: Fn(&str) -> Option<u8>,
{
    entries
        .iter()
        .filter_map(|entry| specificity(entry.value).map(|rank| (rank, entry.quality)))
        .fold(None, |best: Option<(u8, f32)>, (rank, quality)| match best {
            Some((best_rank, _)) if best_rank >= rank => best,
            _ => Some((rank, quality)),
        })
        .map(|(_, quality)| quality)
}

fn media_specificity(range: &str, mime: &Mime) -> Option<u8> {
    let (kind, subtype) = range.split_once('/')?;
    let (kind, subtype) = (kind.trim(), subtype.trim());
    let kind_matches = kind == "*" || kind.eq_ignore_ascii_case(mime.type_().as_str());
    let subtype_matches = subtype == "*" || subtype.eq_ignore_ascii_case(mime.subtype().as_str());
    if !kind_matches || !subtype_matches {
        return None;
    }
    Some(match (kind == "*", subtype == "*") {
        (false, false) => 2,
        (false, true) => 1,
        _ => 0,
    })
}

/// Whether the `Accept` header allows `mime`.
pub fn accepts_media_type(headers: &HeaderMap, mime: &Mime) -> bool {
    match parse_list(headers, &http::header::ACCEPT) {
        None => true,
        Some(entries) => {
            best_quality(&entries, |range| media_specificity(range, mime)).is_some_and(|q| q > 0.0)
        }
    }
}

/// Whether the `Accept-Encoding` header allows `encoding`.
///
/// `identity` is acceptable unless it is refused explicitly or through `*;q=0`.
pub fn accepts_encoding(headers: &HeaderMap, encoding: &str) -> bool {
    let entries = match parse_list(headers, &http::header::ACCEPT_ENCODING) {
        None => return true,
        Some(entries) => entries,
    };
    let quality = best_quality(&entries, |value| {
        if value.eq_ignore_ascii_case(encoding) {
            Some(1)
        } else if value == "*" {
            Some(0)
        } else {
            None
        }
    });
    match quality {
        Some(q) => q > 0.0,
        None => encoding.eq_ignore_ascii_case("identity"),
    }
}

/// Whether the `Accept-Language` header allows `language`.
///
/// Primary tags match in both directions: `en-US` in the header allows `en`, and `en` in the
/// header allows `en-GB`.
pub fn accepts_language(headers: &HeaderMap, language: &str) -> bool {
    let entries = match parse_list(headers, &http::header::ACCEPT_LANGUAGE) {
        None => return true,
        Some(entries) => entries,
    };
    let primary = |tag: &str| tag.split('-').next().unwrap_or(tag).to_ascii_lowercase();
    let wanted = primary(language);
    best_quality(&entries, |value| {
        if value.eq_ignore_ascii_case(language) {
            Some(3)
        } else if primary(value) == language.to_ascii_lowercase() {
            Some(2)
        } else if value.eq_ignore_ascii_case(&wanted) {
            Some(1)
        } else if value == "*" {
            Some(0)
        } else {
            None
        }
    })
    .is_some_and(|q| q > 0.0)
}

/// Whether the `Accept-Charset` header allows `charset`.
pub fn accepts_charset(headers: &HeaderMap, charset: &str) -> bool {
    match parse_list(headers, &http::header::ACCEPT_CHARSET) {
        None => true,
        Some(entries) => best_quality(&entries, |value| {
            if value.eq_ignore_ascii_case(charset) {
                Some(1)
            } else if value == "*" {
                Some(0)
            } else {
                None
            }
        })
        .is_some_and(|q| q > 0.0),
    }
}

/// Pick the offered media type the `Accept` header likes best.
///
/// Ties go to the earlier offer; a missing header picks the first offer.
pub fn preferred_media_type<'o>(headers: &HeaderMap, offers: &[&'o str]) -> Option<&'o str> {
    let entries = match parse_list(headers, &http::header::ACCEPT) {
        None => return offers.first().copied(),
        Some(entries) => entries,
    };
    offers
        .iter()
        .filter_map(|offer| {
            let mime: Mime = offer.parse().ok()?;
            let quality = best_quality(&entries, |range| media_specificity(range, &mime))?;
            if quality > 0.0 {
                Some((*offer, quality))
            } else {
                None
            }
        })
        .fold(None, |best: Option<(&'o str, f32)>, (offer, quality)| match best {
            Some((_, best_quality)) if best_quality >= quality => best,
            _ => Some((offer, quality)),
        })
        .map(|(offer, _)| offer)
}
