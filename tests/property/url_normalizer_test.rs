//! Tests for address-bar input normalization.

use proptest::prelude::*;
use rstest::rstest;
use split_tab_plus::services::url_normalizer::{normalize_input, SEARCH_URL_PREFIX};

#[rstest]
#[case("example.com", "https://example.com")]
#[case("http://x", "http://x")]
#[case("a/b", "https://a/b")]
#[case("hello world", "https://www.google.com/search?q=hello%20world")]
#[case("sub.domain.co.uk/path?q=1", "https://sub.domain.co.uk/path?q=1")]
#[case("File:///etc/hosts", "File:///etc/hosts")]
#[case("c++ & rust", "https://www.google.com/search?q=c%2B%2B%20%26%20rust")]
fn test_examples(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(normalize_input(input).as_deref(), Some(expected));
}

proptest! {
    #[test]
    fn prop_blank_is_ignored(ws in "[ \t\r\n]{0,8}") {
        prop_assert_eq!(normalize_input(&ws), None);
    }

    #[test]
    fn prop_explicit_http_unchanged(rest in "[a-z0-9./?=&-]{0,30}", secure in any::<bool>()) {
        let url = format!("{}://{}", if secure { "https" } else { "http" }, rest);
        prop_assert_eq!(normalize_input(&url), Some(url.clone()));
    }

    #[test]
    fn prop_domain_like_gets_https(label in "[a-z0-9-]{1,12}", tld in "[a-z]{2,6}") {
        let host = format!("{}.{}", label, tld);
        prop_assert_eq!(normalize_input(&host), Some(format!("https://{}", host)));
    }

    #[test]
    fn prop_words_become_search_queries(words in prop::collection::vec("[a-z]{1,8}", 2..5)) {
        let query = words.join(" ");
        let target = normalize_input(&query).unwrap();
        prop_assert!(target.starts_with(SEARCH_URL_PREFIX));
        let encoded = &target[SEARCH_URL_PREFIX.len()..];
        prop_assert!(!encoded.contains(' '));
        prop_assert_eq!(urlencoding::decode(encoded).unwrap(), query);
    }

    #[test]
    fn prop_result_is_trimmed(input in "[ ]{0,3}[a-z]{1,10}\\.[a-z]{2,4}[ ]{0,3}") {
        let target = normalize_input(&input).unwrap();
        prop_assert_eq!(target, format!("https://{}", input.trim()));
    }
}
