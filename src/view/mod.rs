//! Page state, rendering and user actions.

mod controller;
mod debounce;
mod document;
mod listing;
mod render;
mod search;
mod state;

pub use controller::{Action, Route, ViewController};
pub use debounce::SEARCH_DELAY;
pub use document::{Document, HtmlDocument};
pub use listing::PAGE_SIZE;
pub use state::{AppState, Phase, SortKey, View};
