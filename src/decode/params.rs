use std::collections::HashMap;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::models::ResultsView;

/// Path segments and query parameters of a url, as plain strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParams {
    segments: Vec<String>,
    params: HashMap<String, Vec<String>>,
}

impl UrlParams {
    pub fn new(segments: Vec<String>, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut params: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in pairs {
            params.entry(key).or_default().push(value);
        }
        Self { segments, params }
    }

    /// Decoded non-empty path segments and query pairs of `url`.
    pub fn from_url(url: &Url) -> Self {
        let segments = url
            .path_segments()
            .map(|segments| {
                segments
                    .filter(|s| !s.is_empty())
                    .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        Self::new(segments, url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Value of a parameter given exactly once. Repeated parameters count as absent.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.params.get(name).map(Vec::as_slice) {
            Some([value]) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Leading integer of a parameter, ignoring anything after it (`"40abc"` is 40).
    pub fn get_number(&self, name: &str) -> Option<i64> {
        parse_leading_int(self.get_string(name)?)
    }

    /// The result list named by the last path segment.
    pub fn viewed_results(&self) -> Option<ResultsView> {
        self.segments.last().and_then(|s| ResultsView::from_segment(s))
    }
}

fn parse_leading_int(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let (sign, rest) = match value.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, value.strip_prefix('+').unwrap_or(value)),
    };
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse::<i64>().ok().map(|n| sign * n)
}
