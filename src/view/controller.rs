use std::str::FromStr;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use shellcache::Network;
use tracing::{debug, warn};

use super::debounce::{Debouncer, SEARCH_DELAY};
use super::document::Document;
use super::listing::{self, PAGE_SIZE, paginate, sorted_posts};
use super::render;
use super::search::{is_searchable, search};
use super::state::{AppState, Phase, SortKey, View};
use crate::error::{ActionError, DataLoadError, NotFoundError};
use crate::news::Post;
use crate::news::api::{Endpoints, load_data};

const PAGES: [&str; 4] = ["homePage", "allNewsPage", "searchPage", "newsDetailPage"];

/// Navigation targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    AllNews,
    Search(String),
    Detail(u32),
}

/// User actions, as named by the `data-action` attributes of the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ShowHome,
    ShowAll,
    Show(u32),
    Back,
    Sort(SortKey),
    LoadMore,
    /// Jump to a page of all news; earlier pages stay listed.
    Page(usize),
    /// Run a full search; `None` submits the search box content.
    Submit(Option<String>),
    /// A keystroke in the search box, feeding the dropdown.
    Input(String),
    Dismiss,
    HideError,
}

impl Action {
    /// Map a `data-action` name and its argument (`data-post-id`, the sort
    /// value, the typed text) to an action.
    pub fn parse(name: &str, arg: Option<&str>) -> Result<Self, ActionError> {
        let required = || arg.ok_or_else(|| ActionError::MissingArgument(name.to_string()));
        let invalid = |value: &str, reason: String| ActionError::Invalid {
            action: name.to_string(),
            value: value.to_string(),
            reason,
        };
        Ok(match name {
            "home" => Action::ShowHome,
            "all" => Action::ShowAll,
            "show" => {
                let value = required()?;
                let id = value.parse().map_err(|e| invalid(value, format!("{e}")))?;
                Action::Show(id)
            }
            "back" => Action::Back,
            "sort" => {
                let value = required()?;
                Action::Sort(value.parse().map_err(|e| invalid(value, e))?)
            }
            "more" => Action::LoadMore,
            "page" => {
                let value = required()?;
                let page = value.parse().map_err(|e| invalid(value, format!("{e}")))?;
                Action::Page(page)
            }
            "search" => Action::Submit(arg.map(str::to_string)),
            "input" => Action::Input(arg.unwrap_or_default().to_string()),
            "dismiss" => Action::Dismiss,
            "hide-error" => Action::HideError,
            other => return Err(ActionError::Unknown(other.to_string())),
        })
    }
}

/// `"show 3"`, `"search rust news"`: the name, then everything after the
/// first space as the argument.
impl FromStr for Action {
    type Err = ActionError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        match line.split_once(' ') {
            Some((name, arg)) => Action::parse(name, Some(arg.trim())),
            None => Action::parse(line, None),
        }
    }
}

/// Owns the application state and projects it onto a [`Document`].
pub struct ViewController<D> {
    state: AppState,
    document: D,
    debouncer: Debouncer<String>,
}

impl<D: Document> ViewController<D> {
    pub fn new(document: D) -> Self {
        let mut controller = Self {
            state: AppState::default(),
            document,
            debouncer: Debouncer::new(SEARCH_DELAY),
        };
        controller.render();
        controller
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    /// Fetch posts and users, then show the home page, or the error banner if
    /// either request failed.
    pub fn load<N: Network>(
        &mut self,
        network: &N,
        endpoints: &Endpoints,
        today: NaiveDate,
    ) -> Result<(), DataLoadError> {
        match load_data(network, endpoints, today) {
            Ok(data) => {
                self.state.posts = data.posts;
                self.state.users = data.users;
                self.state.phase = Phase::Ready;
                self.show_home();
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "could not load news");
                self.state.phase = Phase::Failed(format!("Failed to load data: {e}"));
                self.state.error_visible = true;
                self.render();
                Err(e)
            }
        }
    }

    pub fn navigate(&mut self, route: Route) -> Result<(), NotFoundError> {
        match route {
            Route::Home => self.show_home(),
            Route::AllNews => self.show_all_news(),
            Route::Search(query) => self.show_search(query),
            Route::Detail(post_id) => return self.show_detail(post_id),
        }
        Ok(())
    }

    pub fn show_home(&mut self) {
        self.state.page = 1;
        self.enter(View::Home);
    }

    pub fn show_all_news(&mut self) {
        self.state.page = 1;
        self.enter(View::AllNews);
    }

    pub fn show_search(&mut self, query: String) {
        self.state.search_query = query;
        self.enter(View::Search);
    }

    /// Open a post; an unknown id leaves everything as it was.
    pub fn show_detail(&mut self, post_id: u32) -> Result<(), NotFoundError> {
        if self.state.post(post_id).is_none() {
            return Err(NotFoundError { post_id });
        }
        self.state.back_to = match self.state.view {
            View::Search => View::Search,
            View::Detail(_) => self.state.back_to,
            View::Home | View::AllNews => View::Home,
        };
        self.enter(View::Detail(post_id));
        Ok(())
    }

    /// Leave the detail view: replay the last search if that is where the
    /// user came from, otherwise go home.
    pub fn back(&mut self) {
        match self.state.back_to {
            View::Search => self.show_search(self.state.search_query.clone()),
            _ => self.show_home(),
        }
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.state.sort = sort;
        self.enter(View::AllNews);
    }

    pub fn load_more(&mut self) {
        self.state.page += 1;
        self.enter(View::AllNews);
    }

    /// All news down to `page`, clamped to the last page that lists
    /// anything.
    pub fn show_page(&mut self, page: usize) {
        let last = self.state.posts.len().div_ceil(PAGE_SIZE).max(1);
        self.state.page = page.clamp(1, last);
        self.enter(View::AllNews);
    }

    fn enter(&mut self, view: View) {
        self.state.view = view;
        self.state.quick_search = None;
        self.render();
    }

    pub fn on_search_input(&mut self, text: &str, now: Instant) {
        self.state.search_input = text.to_string();
        self.debouncer.input(text.to_string(), now);
        self.render();
    }

    /// Run the dropdown search once typing has paused. Returns whether a
    /// query fired.
    pub fn poll_input(&mut self, now: Instant) -> bool {
        let Some(query) = self.debouncer.poll(now) else {
            return false;
        };
        self.state.quick_search = is_searchable(&query).then_some(query);
        self.render();
        true
    }

    pub fn pending_input(&self, now: Instant) -> Option<Duration> {
        self.debouncer.remaining(now)
    }

    pub fn submit_search(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        self.debouncer.cancel();
        self.state.search_input.clear();
        self.show_search(query.to_string());
    }

    pub fn dismiss(&mut self) {
        self.state.quick_search = None;
        self.render();
    }

    pub fn hide_error(&mut self) {
        self.state.error_visible = false;
        self.render();
    }

    pub fn dispatch(&mut self, action: Action, now: Instant) {
        debug!(?action, "dispatching");
        match action {
            Action::ShowHome => self.show_home(),
            Action::ShowAll => self.show_all_news(),
            Action::Show(post_id) => {
                if let Err(e) = self.show_detail(post_id) {
                    debug!(error = %e, "ignoring navigation");
                }
            }
            Action::Back => self.back(),
            Action::Sort(sort) => self.set_sort(sort),
            Action::LoadMore => self.load_more(),
            Action::Page(page) => self.show_page(page),
            Action::Submit(query) => {
                let query = query.unwrap_or_else(|| self.state.search_input.clone());
                self.submit_search(&query);
            }
            Action::Input(text) => self.on_search_input(&text, now),
            Action::Dismiss => self.dismiss(),
            Action::HideError => self.hide_error(),
        }
    }

    /// Posts the current page lists, in display order.
    pub fn visible_posts(&self) -> Vec<&Post> {
        let state = &self.state;
        match state.view {
            View::Home => {
                let (featured, latest) = listing::home(&state.posts);
                featured.iter().chain(latest).collect()
            }
            View::AllNews => {
                let sorted = sorted_posts(&state.posts, state.sort);
                paginate(&sorted, state.page, PAGE_SIZE).to_vec()
            }
            View::Search => search(&state.posts, &state.search_query),
            View::Detail(post_id) => state.post(post_id).into_iter().collect(),
        }
    }

    pub fn quick_results(&self) -> Option<Vec<&Post>> {
        let query = self.state.quick_search.as_deref()?;
        Some(search(&self.state.posts, query))
    }

    /// Whether "load more" would show anything new.
    pub fn has_more(&self) -> bool {
        self.state.page.saturating_mul(PAGE_SIZE) < self.state.posts.len()
    }

    /// Write the whole state to the document. Rendering twice changes
    /// nothing.
    pub fn render(&mut self) {
        let state = &self.state;
        let doc = &mut self.document;

        let loading = state.phase == Phase::Loading;
        doc.set_visible("loading", loading);
        doc.set_visible("app", !loading);
        doc.set_visible("errorMessage", state.error_visible);
        if let Phase::Failed(message) = &state.phase {
            doc.set_text("errorText", message);
        }
        doc.set_value("searchInput", &state.search_input);
        if state.phase != Phase::Ready {
            return;
        }

        let active = match state.view {
            View::Home => "homePage",
            View::AllNews => "allNewsPage",
            View::Search => "searchPage",
            View::Detail(_) => "newsDetailPage",
        };
        for page in PAGES {
            doc.set_class(page, "active", page == active);
        }
        doc.set_class("navHome", "active", state.view == View::Home);
        doc.set_class("navAll", "active", state.view == View::AllNews);

        match state.view {
            View::Home => {
                let (featured, latest) = listing::home(&state.posts);
                doc.set_inner_html("featuredNewsGrid", render::cards(featured));
                doc.set_inner_html("latestNewsGrid", render::cards(latest));
            }
            View::AllNews => {
                let sorted = sorted_posts(&state.posts, state.sort);
                let shown = paginate(&sorted, state.page, PAGE_SIZE);
                doc.set_inner_html("allNewsGrid", render::cards(shown.iter().copied()));
                doc.set_visible("loadMoreBtn", shown.len() < sorted.len());
                doc.set_value("sortSelect", state.sort.as_str());
            }
            View::Search => {
                let results = search(&state.posts, &state.search_query);
                doc.set_inner_html(
                    "searchQuery",
                    render::search_heading(&state.search_query, results.len()),
                );
                doc.set_inner_html("searchResultsGrid", render::cards(results));
            }
            View::Detail(post_id) => {
                if let Some(post) = state.post(post_id) {
                    doc.set_inner_html("newsDetail", render::detail(post));
                }
            }
        }

        match &state.quick_search {
            Some(query) => {
                let results = search(&state.posts, query);
                doc.set_inner_html("searchResults", render::dropdown(&results, query));
                doc.set_visible("searchResults", true);
            }
            None => doc.set_visible("searchResults", false),
        }
    }
}
