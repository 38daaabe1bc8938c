use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::state::SortKey;
use crate::news::Post;

pub const PAGE_SIZE: usize = 6;
pub const FEATURED: usize = 3;
pub const LATEST: usize = 6;

pub fn sorted_posts(posts: &[Post], sort: SortKey) -> Vec<&Post> {
    let mut sorted: Vec<&Post> = posts.iter().collect();
    match sort {
        SortKey::Newest => {}
        SortKey::Oldest => sorted.reverse(),
        SortKey::Title => sorted.sort_by(|a, b| locale_cmp(&a.title, &b.title)),
    }
    sorted
}

/// Browser-like collation. Accents and case are ignored at first, with
/// punctuation before digits before letters. Ties go unaccented before
/// accented, then lowercase before uppercase.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| folded(a).cmp(folded(b)))
        .then_with(|| b.cmp(a))
}

fn primary_key(text: &str) -> Vec<(u8, char)> {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| {
            let class = if c.is_alphabetic() {
                2
            } else if c.is_numeric() {
                1
            } else {
                0
            };
            (class, c)
        })
        .collect()
}

fn folded(text: &str) -> impl Iterator<Item = char> + '_ {
    text.nfd().flat_map(char::to_lowercase)
}

/// The first `page * page_size` items. Earlier pages stay included.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let end = page.saturating_mul(page_size).min(items.len());
    &items[..end]
}

/// Featured and latest slices of the home page.
pub fn home(posts: &[Post]) -> (&[Post], &[Post]) {
    let featured = &posts[..FEATURED.min(posts.len())];
    let rest = &posts[featured.len()..];
    (featured, &rest[..LATEST.min(rest.len())])
}
