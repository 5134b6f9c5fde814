use crate::utils::{bare_domain, capitalize_first};

/// Builds the short `Site.tld` subtitle shown under the card title.
///
/// The "tld" is simply the second dot-separated label of the host, so
/// `https://news.ycombinator.com` yields `News.ycombinator`. When a site name
/// is given it replaces the first label: a multi-word name whose second word
/// is capitalized (`"New York"`) is treated as one brand and joined
/// (`NewYork`), otherwise only its first word is kept.
pub fn build_display_string(url: &str, site_name: Option<&str>) -> String {
    let domain = bare_domain(url);
    let mut labels = domain.split('.');
    let first = labels.next().unwrap_or_default();
    let tld = labels.next().unwrap_or_default();

    let domain_name = match site_name {
        None => capitalize_first(first),
        Some(name) => brand_name(name),
    };

    format!("{domain_name}.{tld}")
}

fn brand_name(site_name: &str) -> String {
    let mut tokens = site_name.split(' ');
    let head = tokens.next().unwrap_or_default();

    let compound = tokens
        .next()
        .and_then(|second| second.chars().next())
        .is_some_and(char::is_uppercase);

    if compound {
        site_name.replace(' ', "")
    } else {
        head.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_site_name() {
        assert_eq!(build_display_string("https://www.example.com/a", None), "Example.com");
        assert_eq!(build_display_string("http://rust-lang.org?x=1", None), "Rust-lang.org");
        assert_eq!(
            build_display_string("https://news.ycombinator.com/item", None),
            "News.ycombinator"
        );
    }

    #[test]
    fn test_compound_brand_is_joined() {
        assert_eq!(
            build_display_string("https://example.org", Some("New York")),
            "NewYork.org"
        );
        assert_eq!(
            build_display_string("https://example.org", Some("The New York Times")),
            "TheNewYorkTimes.org"
        );
    }

    #[test]
    fn test_single_word_or_lowercase_second_word() {
        assert_eq!(build_display_string("https://example.org", Some("The")), "The.org");
        assert_eq!(
            build_display_string("https://www.github.com/x", Some("GitHub")),
            "GitHub.com"
        );
        assert_eq!(
            build_display_string("https://example.com", Some("Hacker news daily")),
            "Hacker.com"
        );
        // Double space gives an empty second token, which is not uppercase.
        assert_eq!(build_display_string("https://example.com", Some("Foo  Bar")), "Foo.com");
    }

    #[test]
    fn test_degenerate_domain_without_dot() {
        assert_eq!(build_display_string("http://localhost:8080/", None), "Localhost:8080.");
        assert_eq!(build_display_string("", Some("Site")), "Site.");
    }
}
