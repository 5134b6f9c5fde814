use regex::Regex;
use std::sync::LazyLock;

// Host-ish run, a dot, a 2-4 letter suffix, then an optional path. The
// boundary after the suffix only knows ASCII word characters.
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[-a-zA-Z0-9@:%_+.~#?&/=]{2,256}\.[a-z]{2,4}(?-u:\b)(/[-a-zA-Z0-9@:%_+.~#?&/=]*)?")
        .expect("URL pattern must compile")
});

/// Returns the first URL-shaped substring of `text`.
///
/// Used to turn a free-text source into the destination opened when the card
/// is tapped. `None` means there is nothing to open and the tap must be
/// suppressed.
pub fn find_first_url(text: &str) -> Option<&str> {
    URL_PATTERN.find(text).map(|m| m.as_str())
}

/// Every URL-shaped substring of `text`, in order.
pub fn find_urls(text: &str) -> Vec<&str> {
    URL_PATTERN.find_iter(text).map(|m| m.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_url() {
        assert_eq!(
            find_first_url("https://www.example.com/page?id=3"),
            Some("https://www.example.com/page?id=3")
        );
    }

    #[test]
    fn test_url_inside_text() {
        assert_eq!(
            find_first_url("check out https://www.rust-lang.org/learn today"),
            Some("https://www.rust-lang.org/learn")
        );
        assert_eq!(find_first_url("go to example.com now"), Some("example.com"));
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(
            find_urls("ab.io and https://b.dev/x"),
            vec!["ab.io", "https://b.dev/x"]
        );
        assert_eq!(find_first_url("ab.io and https://b.dev/x"), Some("ab.io"));
        // A single character before the dot is too short.
        assert_eq!(find_first_url("a.io"), None);
    }

    #[test]
    fn test_no_match() {
        assert_eq!(find_first_url("no links here"), None);
        assert_eq!(find_first_url("hello.world"), None);
        assert_eq!(find_first_url("x.c"), None);
        assert_eq!(find_first_url(""), None);
    }

    #[test]
    fn test_non_ascii_letter_ends_the_suffix() {
        assert_eq!(find_first_url("visit example.comé now"), Some("example.com"));
        assert_eq!(find_first_url("see ab.io/päge"), Some("ab.io/p"));
    }

    #[test]
    fn test_suffix_must_be_lowercase_letters() {
        assert_eq!(find_first_url("EXAMPLE.COM"), None);
        assert_eq!(find_first_url("EXAMPLE.com"), Some("EXAMPLE.com"));
    }
}
