pub mod api;

use chrono::{Days, NaiveDate};
use serde::Deserialize;
use sha2::{Digest, Sha256};

const EXCERPT_CHARS: usize = 150;
const GLYPHS: [&str; 10] = ["📰", "🌍", "💼", "🏛️", "🔬", "🎭", "⚽", "🎵", "📱", "🚗"];
const POSTS_PER_DAY: usize = 3;
const SENTENCES_PER_PARAGRAPH: usize = 2;

/// A post as the API returns it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawPost {
    pub id: u32,
    #[serde(rename = "userId")]
    pub user_id: u32,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: u32,
    pub name: String,
}

impl User {
    pub fn unknown() -> Self {
        Self {
            id: 0,
            name: "Unknown author".to_string(),
        }
    }
}

/// Canned link blocks appended to some articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boilerplate {
    MoreInfo,
    SeeAlso,
}

impl Boilerplate {
    pub fn html(self) -> &'static str {
        match self {
            Boilerplate::MoreInfo => {
                r##"More information is available on the <a href="#">official website</a>."##
            }
            Boilerplate::SeeAlso => {
                r##"See also: <a href="#">related article</a> and <a href="#">news archive</a>."##
            }
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Boilerplate::MoreInfo => "More information is available on the official website.",
            Boilerplate::SeeAlso => "See also: related article and news archive.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: u32,
    pub title: String,
    pub body: String,
    pub author: User,
    pub excerpt: String,
    pub image: &'static str,
    /// Display-only; list order is the only ordering that matters.
    pub date: NaiveDate,
    pub paragraphs: Vec<String>,
    pub extras: Vec<Boilerplate>,
}

impl Post {
    /// Enrich the `index`-th post of a listing. Pure in its arguments.
    pub fn derive(raw: RawPost, index: usize, users: &[User], today: NaiveDate) -> Self {
        let author = users
            .iter()
            .find(|user| user.id == raw.user_id)
            .cloned()
            .unwrap_or_else(User::unknown);
        Self {
            id: raw.id,
            excerpt: excerpt(&raw.body),
            image: GLYPHS[raw.id as usize % GLYPHS.len()],
            date: today - Days::new((index / POSTS_PER_DAY) as u64),
            paragraphs: paragraphs(&raw.body),
            extras: extras(raw.id),
            author,
            title: raw.title,
            body: raw.body,
        }
    }

    pub fn display_date(&self) -> String {
        self.date.format("%B %-d, %Y").to_string()
    }
}

pub fn derive_posts(raw: Vec<RawPost>, users: &[User], today: NaiveDate) -> Vec<Post> {
    raw.into_iter()
        .enumerate()
        .map(|(index, post)| Post::derive(post, index, users, today))
        .collect()
}

fn excerpt(body: &str) -> String {
    match body.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

fn paragraphs(body: &str) -> Vec<String> {
    let sentences: Vec<&str> = body.split(". ").collect();
    sentences
        .chunks(SENTENCES_PER_PARAGRAPH)
        .map(|pair| {
            let mut paragraph = pair.join(". ");
            if !paragraph.ends_with('.') {
                paragraph.push('.');
            }
            paragraph
        })
        .collect()
}

/// Roughly half the posts get the "more information" block and a third the
/// "see also" block, decided by the digest of the id so a post always reads
/// the same.
fn extras(id: u32) -> Vec<Boilerplate> {
    let digest = Sha256::digest(id.to_string().as_bytes());
    let mut extras = Vec::new();
    if digest[0] > 127 {
        extras.push(Boilerplate::MoreInfo);
    }
    if digest[1] > 178 {
        extras.push(Boilerplate::SeeAlso);
    }
    extras
}
