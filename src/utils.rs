use unicode_width::UnicodeWidthChar;

use url::Url;

/// Safely truncate a string, ensuring it is not truncated in the middle of multi-byte characters
///
/// This function will:
/// 1. Correctly handle Unicode characters (including Chinese, emoji, etc.)
/// 2. Add ellipsis when maximum length is reached
/// 3. Ensure the output string's display width does not exceed the specified length
#[cfg_attr(not(feature = "logging"), allow(dead_code))]
pub fn truncate_str(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthStr;

    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(1);

        if current_width + char_width + 3 > max_width {
            break;
        }

        result.push(c);
        current_width += char_width;
    }

    result.push_str("...");
    result
}

/// Host part of a URL as written: a leading `http://`/`https://` and `www.`
/// are stripped and everything from the first `/`, `?` or `#` is cut.
///
/// This is plain string slicing, no parsing, so `"Example.com"` keeps its case.
pub fn bare_domain(url: &str) -> &str {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let rest = rest.strip_prefix("www.").unwrap_or(rest);

    match rest.find(|c| matches!(c, '/' | '?' | '#')) {
        Some(end) => &rest[..end],
        None => rest,
    }
}

pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Resolves a possibly relative `href` found in a page against the page URL.
pub fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    base.join(href).ok().map(|u| u.to_string())
}

pub fn default_favicon(page: &Url) -> Option<String> {
    page.join("/favicon.ico").ok().map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("Hello, world!", 10), "Hello, ...");
        assert_eq!(truncate_str("你好，世界！", 8), "你好...");
        assert_eq!(truncate_str("Hello 你好！", 10), "Hello ...");
        assert_eq!(truncate_str("Hi!", 10), "Hi!");
    }

    #[test]
    fn test_bare_domain() {
        assert_eq!(bare_domain("https://www.Example.com/path"), "Example.com");
        assert_eq!(bare_domain("http://news.ycombinator.com?id=1"), "news.ycombinator.com");
        assert_eq!(bare_domain("example.org#top"), "example.org");
        assert_eq!(bare_domain("https://localhost"), "localhost");
        assert_eq!(bare_domain(""), "");
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("example"), "Example");
        assert_eq!(capitalize_first("eXAMPLE"), "EXAMPLE");
        assert_eq!(capitalize_first("élan"), "Élan");
        assert_eq!(capitalize_first(""), "");
    }

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://example.com/blog/post").unwrap();
        assert_eq!(
            resolve_url(&base, "/img/a.png").as_deref(),
            Some("https://example.com/img/a.png")
        );
        assert_eq!(
            resolve_url(&base, "cover.jpg").as_deref(),
            Some("https://example.com/blog/cover.jpg")
        );
        assert_eq!(
            resolve_url(&base, "//cdn.example.net/x.png").as_deref(),
            Some("https://cdn.example.net/x.png")
        );
        assert_eq!(resolve_url(&base, "   "), None);
        assert_eq!(
            default_favicon(&base).as_deref(),
            Some("https://example.com/favicon.ico")
        );
    }
}
