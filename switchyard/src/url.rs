//! URL encoding helpers used by reverse-URL composition.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything outside the RFC 3986 unreserved set is percent-encoded
/// in query keys and values.
const QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a query key or value.
pub fn urlencode(s: &str) -> String {
    utf8_percent_encode(s, QUERY).to_string()
}

/// Encode key/value pairs as a query string, in iteration order.
///
/// Reverse URLs feed this from a sorted map, so the output is
/// alphabetized by key.
pub(crate) fn encode_query<'a>(pairs: impl Iterator<Item = (&'a String, &'a String)>) -> String {
    pairs
        .map(|(k, v)| format!("{}={}", urlencode(k), urlencode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_urlencode() {
        assert_eq!(urlencode("plain"), "plain");
        assert_eq!(urlencode("under_score-dot.~"), "under_score-dot.~");
        assert_eq!(urlencode("hello world"), "hello%20world");
        assert_eq!(urlencode("a=b&c"), "a%3Db%26c");
        assert_eq!(urlencode("50%"), "50%25");
    }

    #[test]
    fn test_encode_query_sorted() {
        let mut pairs = BTreeMap::new();
        pairs.insert("param2".to_string(), "two".to_string());
        pairs.insert("param1".to_string(), "one".to_string());

        assert_eq!(encode_query(pairs.iter()), "param1=one&param2=two");
    }
}
