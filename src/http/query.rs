//! Query string parsing
//!
//! `application/x-www-form-urlencoded` decoding via `url::form_urlencoded`.
//! Like most web frameworks, the first occurrence of a name wins.

use url::form_urlencoded;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parse the raw query (without the leading `?`)
    pub fn parse(query: Option<&str>) -> Self {
        let pairs = query
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        Self { pairs }
    }

    /// First value for `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First value for `name` as an owned string, `None` when absent or empty
    pub fn get_non_empty(&self, name: &str) -> Option<String> {
        self.get(name).filter(|v| !v.is_empty()).map(ToString::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_and_plus_decoding() {
        let params = QueryParams::parse(Some("parameter=10k%CE%A9&part_number=SPX3819M5-3.3&x=a+b"));
        assert_eq!(params.get("parameter"), Some("10kΩ"));
        assert_eq!(params.get("part_number"), Some("SPX3819M5-3.3"));
        assert_eq!(params.get("x"), Some("a b"));
    }

    #[test]
    fn test_first_value_wins_and_empty_is_absent() {
        let params = QueryParams::parse(Some("footprint=R0402&footprint=C0603&parameter="));
        assert_eq!(params.get("footprint"), Some("R0402"));
        assert_eq!(params.get("parameter"), Some(""));
        assert_eq!(params.get_non_empty("parameter"), None);
        assert_eq!(params.get_non_empty("missing"), None);
    }

    #[test]
    fn test_no_query() {
        assert_eq!(QueryParams::parse(None), QueryParams::default());
    }
}
