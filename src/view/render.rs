//! Markup fragments for the portal. Every element a user can act on carries a
//! `data-action` attribute understood by [`super::Action::parse`].

use html_escape::encode_text;
use itertools::Itertools;

use super::search::highlight;
use crate::news::Post;

pub fn news_card(post: &Post) -> String {
    format!(
        r#"<article class="news-card" data-action="show" data-post-id="{id}">
  <div class="news-card-image">{image}</div>
  <div class="news-card-content">
    <h3 class="news-card-title">{title}</h3>
    <p class="news-card-excerpt">{excerpt}</p>
    <div class="news-card-meta">
      <span class="news-card-author">{author}</span>
      <span class="news-card-date">{date}</span>
    </div>
  </div>
</article>"#,
        id = post.id,
        image = post.image,
        title = encode_text(&post.title),
        excerpt = encode_text(&post.excerpt),
        author = encode_text(&post.author.name),
        date = post.display_date(),
    )
}

pub fn cards<'a>(posts: impl IntoIterator<Item = &'a Post>) -> String {
    posts.into_iter().map(news_card).join("\n")
}

pub fn detail(post: &Post) -> String {
    let body = post
        .paragraphs
        .iter()
        .map(|paragraph| format!("<p>{}</p>", encode_text(paragraph)))
        .chain(post.extras.iter().map(|extra| format!("<p>{}</p>", extra.html())))
        .join("");
    format!(
        r#"<button class="back-btn" data-action="back">&larr; Back</button>
<article class="news-detail-content">
  <header class="news-detail-header">
    <h1 class="news-detail-title">{title}</h1>
    <div class="news-detail-meta">
      <span class="news-detail-author">By {author}</span>
      <span class="news-detail-date">{date}</span>
    </div>
  </header>
  <div class="news-detail-image">{image}</div>
  <div class="news-detail-body">{body}</div>
</article>"#,
        title = encode_text(&post.title),
        author = encode_text(&post.author.name),
        date = post.display_date(),
        image = post.image,
    )
}

pub fn search_heading(query: &str, count: usize) -> String {
    format!(
        r#"Search: "<strong>{}</strong>" ({count} results)"#,
        encode_text(query)
    )
}

/// Quick-search dropdown rows.
pub fn dropdown(results: &[&Post], query: &str) -> String {
    if results.is_empty() {
        return r#"<div class="search-result-item">Nothing found</div>"#.to_string();
    }
    results
        .iter()
        .map(|post| {
            format!(
                r#"<div class="search-result-item" data-action="show" data-post-id="{}">
  <div class="search-result-title">{}</div>
  <div class="search-result-snippet">{}</div>
</div>"#,
                post.id,
                highlight(&post.title, query),
                highlight(&post.excerpt, query),
            )
        })
        .join("\n")
}
