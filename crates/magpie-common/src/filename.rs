//! Archive member naming
//!
//! Filenames for downloaded images are derived from the source URL and
//! sanitized before they are written into the ZIP archive.

use std::collections::HashSet;
use std::sync::LazyLock;

use url::Url;

/// Maximum length of a derived filename in characters
pub const MAX_FILENAME_LEN: usize = 200;

/// Fallback filename when a URL yields no usable path segment
pub const FALLBACK_FILENAME: &str = "file.jpg";

/// Characters outside this set are replaced with underscores
static UNSAFE_CHARS: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"[^A-Za-z0-9._-]").expect("Invalid regex pattern"));

/// Replace unsafe filename characters with underscores and cap the length.
///
/// Empty input degrades to `"file"`. The output only contains ASCII
/// alphanumerics, dots, underscores, and hyphens.
///
/// # Examples
///
/// ```
/// use magpie_common::sanitize_filename;
///
/// assert_eq!(sanitize_filename("photo 01.jpg", 200), "photo_01.jpg");
/// assert_eq!(sanitize_filename("", 200), "file");
/// ```
pub fn sanitize_filename(name: &str, max_len: usize) -> String {
    let name = if name.is_empty() { "file" } else { name };
    let mut sanitized = UNSAFE_CHARS.replace_all(name, "_").into_owned();
    // All characters are ASCII after substitution, so byte truncation is safe
    if sanitized.len() > max_len {
        sanitized.truncate(max_len);
    }
    sanitized
}

/// Derive an archive member name from a URL.
///
/// The query string and fragment are dropped, the last path segment is
/// taken as the base name, `.jpg` is appended when the segment carries no
/// extension, and the result is sanitized. Inputs without a usable path
/// segment yield [`FALLBACK_FILENAME`].
///
/// # Examples
///
/// ```
/// use magpie_common::filename_from_url;
///
/// assert_eq!(
///     filename_from_url("https://cdn.example.com/2025_15378.jpg?sig=abc"),
///     "2025_15378.jpg"
/// );
/// assert_eq!(filename_from_url("https://example.com"), "file.jpg");
/// ```
pub fn filename_from_url(url: &str) -> String {
    let clean = url.split_once('?').map_or(url, |(head, _)| head);
    let clean = clean.split_once('#').map_or(clean, |(head, _)| head);

    // Relative inputs fail to parse as absolute URLs; their whole text is
    // treated as the path, matching how a lenient URL splitter behaves.
    let path = match Url::parse(clean) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => clean.to_string(),
    };

    let segment = path.rsplit('/').next().unwrap_or_default();
    let mut basename = if segment.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        segment.to_string()
    };
    if !basename.contains('.') {
        basename.push_str(".jpg");
    }

    sanitize_filename(&basename, MAX_FILENAME_LEN)
}

/// Resolve a name collision by appending `_1`, `_2`, ... before the extension.
///
/// `"a.jpg"` taken twice yields `"a_1.jpg"` then `"a_2.jpg"`. Names without
/// an extension get the counter appended at the end.
pub fn unique_name(candidate: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(candidate) {
        return candidate.to_string();
    }

    let (stem, ext) = split_stem_ext(candidate);
    let mut suffix = 1u32;
    loop {
        let next = if ext.is_empty() {
            format!("{}_{}", stem, suffix)
        } else {
            format!("{}_{}.{}", stem, suffix, ext)
        };
        if !taken.contains(&next) {
            return next;
        }
        suffix += 1;
    }
}

/// Split a filename at the last dot. Leading-dot names keep the dot in the
/// stem and carry no extension.
fn split_stem_ext(name: &str) -> (&str, &str) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, ext),
        _ => (name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taken(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sanitize_replaces_unsafe_chars() {
        assert_eq!(sanitize_filename("photo 01.jpg", 200), "photo_01.jpg");
        assert_eq!(sanitize_filename("a/b\\c.png", 200), "a_b_c.png");
        assert_eq!(sanitize_filename("snapshot(1).jpg", 200), "snapshot_1_.jpg");
        assert_eq!(sanitize_filename("ok-name_1.jpeg", 200), "ok-name_1.jpeg");
    }

    #[test]
    fn test_sanitize_empty_becomes_file() {
        assert_eq!(sanitize_filename("", 200), "file");
    }

    #[test]
    fn test_sanitize_caps_length() {
        let long = "a".repeat(500);
        let out = sanitize_filename(&long, MAX_FILENAME_LEN);
        assert_eq!(out.len(), MAX_FILENAME_LEN);
    }

    #[test]
    fn test_sanitize_multibyte_chars_become_underscores() {
        assert_eq!(sanitize_filename("图片.jpg", 200), "__.jpg");
    }

    #[test]
    fn test_filename_from_url_strips_query() {
        assert_eq!(
            filename_from_url("https://cdn.example.com/photos/2025_15378.jpg?Expires=123&sig=x"),
            "2025_15378.jpg"
        );
    }

    #[test]
    fn test_filename_from_url_strips_fragment() {
        assert_eq!(
            filename_from_url("https://example.com/a/pic.png#section"),
            "pic.png"
        );
    }

    #[test]
    fn test_filename_from_url_without_path() {
        assert_eq!(filename_from_url("https://example.com"), "file.jpg");
        assert_eq!(filename_from_url("https://example.com/dir/"), "file.jpg");
    }

    #[test]
    fn test_filename_from_url_adds_extension() {
        assert_eq!(filename_from_url("https://example.com/photo"), "photo.jpg");
    }

    #[test]
    fn test_filename_from_url_relative_input() {
        assert_eq!(filename_from_url("images/pic.png"), "pic.png");
        assert_eq!(filename_from_url("not a url"), "not_a_url.jpg");
    }

    #[test]
    fn test_filename_from_url_sanitizes_segment() {
        assert_eq!(
            filename_from_url("https://example.com/weird%20name.jpg"),
            "weird_20name.jpg"
        );
    }

    #[test]
    fn test_unique_name_no_collision() {
        assert_eq!(unique_name("a.jpg", &taken(&[])), "a.jpg");
    }

    #[test]
    fn test_unique_name_counts_up() {
        assert_eq!(unique_name("a.jpg", &taken(&["a.jpg"])), "a_1.jpg");
        assert_eq!(
            unique_name("a.jpg", &taken(&["a.jpg", "a_1.jpg"])),
            "a_2.jpg"
        );
    }

    #[test]
    fn test_unique_name_without_extension() {
        assert_eq!(unique_name("readme", &taken(&["readme"])), "readme_1");
    }

    #[test]
    fn test_unique_name_keeps_leading_dot_names_whole() {
        assert_eq!(unique_name(".hidden", &taken(&[".hidden"])), ".hidden_1");
    }

    #[test]
    fn test_unique_name_splits_on_last_dot() {
        assert_eq!(
            unique_name("a.tar.gz", &taken(&["a.tar.gz"])),
            "a.tar_1.gz"
        );
    }
}

#[cfg(test)]
mod prop_tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn sanitized_output_stays_in_charset(name in ".*") {
            let out = sanitize_filename(&name, MAX_FILENAME_LEN);
            prop_assert!(!out.is_empty());
            prop_assert!(out.len() <= MAX_FILENAME_LEN);
            prop_assert!(
                out.bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || b == b'-')
            );
        }

        #[test]
        fn derived_filenames_are_always_safe(url in ".*") {
            let out = filename_from_url(&url);
            prop_assert!(!out.is_empty());
            prop_assert!(out.len() <= MAX_FILENAME_LEN);
            prop_assert!(
                out.bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || b == b'-')
            );
        }
    }
}
