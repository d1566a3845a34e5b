use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Slugs are lowercase alphanumeric words joined by single hyphens
    /// - Valid: "rust-tips", "post1", "a-b-c"
    /// - Invalid: "-post", "post-", "post--name", "Post", "post_name"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    static ref NON_SLUG_CHARS: Regex = Regex::new(r"[^a-z0-9]+").unwrap();

    /// Cover file names keep only a safe character set
    static ref UNSAFE_FILE_CHARS: Regex = Regex::new(r"[^A-Za-z0-9._-]+").unwrap();
}

/// Turns free text into a URL slug. Returns an empty string when nothing
/// usable is left (the caller decides the fallback).
pub fn slugify(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    NON_SLUG_CHARS
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Strips directory parts and unsafe characters from an uploaded file name
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned = UNSAFE_FILE_CHARS.replace_all(base, "-");
    let cleaned = cleaned.trim_matches(|c| c == '-' || c == '.');

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_regex_valid() {
        assert!(SLUG_REGEX.is_match("rust-tips"));
        assert!(SLUG_REGEX.is_match("post1"));
        assert!(SLUG_REGEX.is_match("a-b-c"));
    }

    #[test]
    fn test_slug_regex_invalid() {
        assert!(!SLUG_REGEX.is_match("-post")); // starts with hyphen
        assert!(!SLUG_REGEX.is_match("post-")); // ends with hyphen
        assert!(!SLUG_REGEX.is_match("post--name")); // double hyphen
        assert!(!SLUG_REGEX.is_match("Post")); // uppercase
        assert!(!SLUG_REGEX.is_match("")); // empty
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Rust   &  LLMs  "), "rust-llms");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
        assert_eq!(slugify("!!!"), "");
        assert!(SLUG_REGEX.is_match(&slugify("Tech News 2024")));
    }

    #[test]
    fn test_slugify_non_ascii_name_is_empty() {
        assert_eq!(slugify("Привет мир"), "");
        assert_eq!(slugify("Café 2024"), "caf-2024");
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(
            sanitize_file_name("../../etc/passwd"),
            Some("passwd".to_string())
        );
        assert_eq!(
            sanitize_file_name("C:\\photos\\my cover.JPG"),
            Some("my-cover.JPG".to_string())
        );
        assert_eq!(sanitize_file_name("..."), None);
    }
}
