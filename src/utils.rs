use url::Url;

/// Last non-empty path segment of a URL, ignoring trailing slashes
pub fn last_nonempty_segment(url: &Url) -> Option<&str> {
    url.path_segments()?.filter(|s| !s.is_empty()).last()
}

/// Final path segment of a URL, `None` when the path ends in a slash
pub fn final_segment(url: &Url) -> Option<&str> {
    url.path_segments()?.last().filter(|s| !s.is_empty())
}

/// Collapses whitespace runs into single spaces and trims both ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
