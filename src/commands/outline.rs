//! Plain-text rendering of the current page for the terminal.

use std::fmt::Write;

use crate::news::Post;
use crate::view::{Document, Phase, View, ViewController};

struct Style {
    bold: &'static str,
    dim: &'static str,
    date: &'static str,
    reset: &'static str,
}

impl Style {
    fn new(color: bool) -> Self {
        if color {
            Style {
                bold: "\x1b[1m",
                dim: "\x1b[2m",
                date: "\x1b[36m",
                reset: "\x1b[0m",
            }
        } else {
            Style {
                bold: "",
                dim: "",
                date: "",
                reset: "",
            }
        }
    }
}

fn format_post(post: &Post, style: &Style) -> String {
    let Style {
        bold,
        dim,
        date,
        reset,
    } = style;
    format!(
        "{} {bold}#{}{reset} {} {dim}({}){reset} {date}{}{reset}",
        post.image,
        post.id,
        post.title,
        post.author.name,
        post.display_date()
    )
}

fn section(out: &mut String, title: &str, posts: &[&Post], style: &Style) {
    writeln!(out, "{}=== {title} ==={}", style.bold, style.reset).unwrap();
    writeln!(out).unwrap();
    for post in posts {
        writeln!(out, "{}", format_post(post, style)).unwrap();
    }
    writeln!(out).unwrap();
}

fn detail(out: &mut String, post: &Post, style: &Style) {
    writeln!(out, "{} {}{}{}", post.image, style.bold, post.title, style.reset).unwrap();
    writeln!(
        out,
        "{}By {} on {}{}",
        style.dim,
        post.author.name,
        post.display_date(),
        style.reset
    )
    .unwrap();
    for paragraph in &post.paragraphs {
        writeln!(out).unwrap();
        writeln!(out, "{paragraph}").unwrap();
    }
    for extra in &post.extras {
        writeln!(out).unwrap();
        writeln!(out, "{}", extra.text()).unwrap();
    }
    writeln!(out).unwrap();
}

pub(crate) fn render<D: Document>(controller: &ViewController<D>, color: bool) -> String {
    let style = Style::new(color);
    let state = controller.state();
    let mut out = String::new();

    if state.error_visible
        && let Phase::Failed(message) = &state.phase
    {
        writeln!(out, "{message}").unwrap();
    }
    if state.phase != Phase::Ready {
        return out;
    }

    let posts = controller.visible_posts();
    match state.view {
        View::Home => {
            let split = posts.len().min(3);
            section(&mut out, "Featured", &posts[..split], &style);
            section(&mut out, "Latest news", &posts[split..], &style);
        }
        View::AllNews => {
            section(&mut out, &format!("All news ({})", state.sort), &posts, &style);
            if controller.has_more() {
                writeln!(
                    out,
                    "{}Showing {} of {}. Use --page {} for more.{}",
                    style.dim,
                    posts.len(),
                    state.posts.len(),
                    state.page + 1,
                    style.reset
                )
                .unwrap();
            }
        }
        View::Search => {
            let title = format!(
                "Search: \"{}\" ({} results)",
                state.search_query,
                posts.len()
            );
            section(&mut out, &title, &posts, &style);
        }
        View::Detail(_) => {
            if let Some(post) = posts.first() {
                detail(&mut out, post, &style);
            }
        }
    }

    if let (Some(query), Some(results)) = (&state.quick_search, controller.quick_results()) {
        writeln!(out, "{}--- Quick search: {query} ---{}", style.bold, style.reset).unwrap();
        if results.is_empty() {
            writeln!(out, "Nothing found").unwrap();
        }
        for post in results {
            writeln!(out, "{}", format_post(post, &style)).unwrap();
        }
        writeln!(out).unwrap();
    }
    out
}
