use regex::RegexBuilder;

use crate::news::Post;

pub const MAX_RESULTS: usize = 5;
pub const MIN_QUERY_CHARS: usize = 2;

pub fn is_searchable(query: &str) -> bool {
    query.chars().count() >= MIN_QUERY_CHARS
}

/// Posts whose title, body or author name contains `query`, ignoring case.
/// At most [`MAX_RESULTS`], in collection order; short queries match nothing.
pub fn search<'a>(posts: &'a [Post], query: &str) -> Vec<&'a Post> {
    if !is_searchable(query) {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    posts
        .iter()
        .filter(|post| {
            post.title.to_lowercase().contains(&needle)
                || post.body.to_lowercase().contains(&needle)
                || post.author.name.to_lowercase().contains(&needle)
        })
        .take(MAX_RESULTS)
        .collect()
}

/// HTML-escape `text`, wrapping every case-insensitive occurrence of `query`
/// in `<mark>`.
pub fn highlight(text: &str, query: &str) -> String {
    let escaped = |s: &str| html_escape::encode_text(s).into_owned();
    if query.is_empty() {
        return escaped(text);
    }
    let Ok(pattern) = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    else {
        return escaped(text);
    };

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for found in pattern.find_iter(text) {
        out.push_str(&escaped(&text[last..found.start()]));
        out.push_str("<mark>");
        out.push_str(&escaped(found.as_str()));
        out.push_str("</mark>");
        last = found.end();
    }
    out.push_str(&escaped(&text[last..]));
    out
}
