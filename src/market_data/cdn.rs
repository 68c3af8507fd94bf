// Repair relative document paths returned by the financials endpoint into
// absolute download URLs on the exchange CDN.

use reqwest::Url;

/// Directory every CDN document lives under.
pub const CDN_PREFIX: &str = "cmt";

/// Build an absolute CDN URL out of a raw upstream path.
///
/// Handles a duplicated `cmt/cmt/` prefix, a missing `cmt/` prefix, leading
/// slashes and surrounding whitespace. Each segment is percent-encoded on its
/// own so separators survive. Blank input gives an empty string.
pub fn fix_cdn_path(cdn_base: &Url, raw: &str) -> String {
    let mut clean = raw.trim().trim_start_matches('/');
    if clean.is_empty() {
        return String::new();
    }

    let single = format!("{CDN_PREFIX}/");
    let doubled = format!("{CDN_PREFIX}/{CDN_PREFIX}/");
    if clean.starts_with(&doubled) {
        clean = &clean[single.len()..];
    }

    let mut url = cdn_base.clone();
    match url.path_segments_mut() {
        Ok(mut segments) => {
            segments.pop_if_empty();
            if !clean.starts_with(&single) {
                segments.push(CDN_PREFIX);
            }
            segments.extend(clean.split('/'));
        }
        Err(()) => return String::new(),
    }
    url.to_string()
}
