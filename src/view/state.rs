use std::fmt;
use std::str::FromStr;

use crate::news::{Post, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Home,
    AllNews,
    Search,
    Detail(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    Title,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::Title => "title",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(SortKey::Newest),
            "oldest" => Ok(SortKey::Oldest),
            "title" => Ok(SortKey::Title),
            other => Err(format!("unknown sort key {other:?}, use newest, oldest or title")),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

/// Everything the page shows, owned by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub view: View,
    /// Where `back` leads from the detail view.
    pub back_to: View,
    /// Load-more cursor, 1-based.
    pub page: usize,
    pub sort: SortKey,
    /// Last executed full search.
    pub search_query: String,
    /// Query shown in the dropdown; `None` while the dropdown is hidden.
    pub quick_search: Option<String>,
    pub search_input: String,
    pub phase: Phase,
    pub error_visible: bool,
    pub posts: Vec<Post>,
    pub users: Vec<User>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            view: View::Home,
            back_to: View::Home,
            page: 1,
            sort: SortKey::Newest,
            search_query: String::new(),
            quick_search: None,
            search_input: String::new(),
            phase: Phase::Loading,
            error_visible: false,
            posts: Vec::new(),
            users: Vec::new(),
        }
    }
}

impl AppState {
    pub fn post(&self, id: u32) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == id)
    }
}
