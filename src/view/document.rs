//! The rendering surface the controller writes to.

use std::collections::{BTreeMap, BTreeSet};

use html_escape::{encode_double_quoted_attribute, encode_text};

/// Element-level operations of a page, addressed by element id.
///
/// Writes to an id the document does not have are ignored.
pub trait Document {
    fn set_inner_html(&mut self, id: &str, html: String);
    fn set_text(&mut self, id: &str, text: &str);
    fn set_class(&mut self, id: &str, class: &str, on: bool);
    fn set_visible(&mut self, id: &str, visible: bool);
    fn set_value(&mut self, id: &str, value: &str);
    fn element(&self, id: &str) -> Option<&Element>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: &'static str,
    attrs: Vec<(&'static str, &'static str)>,
    classes: BTreeSet<String>,
    visible: bool,
    inner_html: String,
    value: Option<String>,
}

impl Element {
    fn new(tag: &'static str, classes: &[&str]) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            classes: classes.iter().map(|c| c.to_string()).collect(),
            visible: true,
            inner_html: String::new(),
            value: None,
        }
    }

    fn attr(mut self, name: &'static str, value: &'static str) -> Self {
        self.attrs.push((name, value));
        self
    }

    fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    fn with_html(mut self, html: &str) -> Self {
        self.inner_html = html.to_string();
        self
    }

    pub fn inner_html(&self) -> &str {
        &self.inner_html
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    fn open_tag(&self, id: &str) -> String {
        let mut tag = format!(r#"<{} id="{id}""#, self.tag);
        for (name, value) in &self.attrs {
            tag.push_str(&format!(r#" {name}="{value}""#));
        }
        if !self.classes.is_empty() {
            let classes = self.classes.iter().map(String::as_str).collect::<Vec<_>>();
            tag.push_str(&format!(r#" class="{}""#, classes.join(" ")));
        }
        if !self.visible {
            tag.push_str(r#" style="display: none""#);
        }
        if let Some(value) = &self.value {
            tag.push_str(&format!(r#" value="{}""#, encode_double_quoted_attribute(value)));
        }
        tag.push('>');
        tag
    }
}

/// In-memory portal page that serialises to a standalone HTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlDocument {
    elements: BTreeMap<&'static str, Element>,
}

const SORT_OPTIONS: [(&str, &str); 3] = [
    ("newest", "Newest first"),
    ("oldest", "Oldest first"),
    ("title", "By title"),
];

impl HtmlDocument {
    /// The portal skeleton: loading indicator, error banner, search box and
    /// the four pages.
    pub fn portal() -> Self {
        let elements = [
            ("loading", Element::new("div", &["loading"]).with_html("Loading news...")),
            ("app", Element::new("div", &["app"]).hidden()),
            ("errorMessage", Element::new("div", &["error-message"]).hidden()),
            ("errorText", Element::new("span", &["error-text"])),
            (
                "navHome",
                Element::new("button", &["nav-btn", "active"])
                    .attr("data-action", "home")
                    .with_html("Home"),
            ),
            (
                "navAll",
                Element::new("button", &["nav-btn"])
                    .attr("data-action", "all")
                    .with_html("All news"),
            ),
            (
                "searchInput",
                Element::new("input", &["search-input"])
                    .attr("type", "search")
                    .attr("placeholder", "Search news...")
                    .attr("data-action", "input"),
            ),
            ("searchResults", Element::new("div", &["search-results"]).hidden()),
            ("homePage", Element::new("section", &["page", "active"])),
            ("featuredNewsGrid", Element::new("div", &["news-grid", "featured"])),
            ("latestNewsGrid", Element::new("div", &["news-grid"])),
            ("allNewsPage", Element::new("section", &["page"])),
            (
                "sortSelect",
                Element::new("select", &["sort-select"]).attr("data-action", "sort"),
            ),
            ("allNewsGrid", Element::new("div", &["news-grid"])),
            (
                "loadMoreBtn",
                Element::new("button", &["load-more-btn"])
                    .attr("data-action", "more")
                    .with_html("Load more"),
            ),
            ("searchPage", Element::new("section", &["page"])),
            ("searchQuery", Element::new("h2", &["search-query"])),
            ("searchResultsGrid", Element::new("div", &["news-grid"])),
            ("newsDetailPage", Element::new("section", &["page"])),
            ("newsDetail", Element::new("div", &["news-detail"])),
        ];
        Self {
            elements: elements.into_iter().collect(),
        }
    }

    fn open(&self, id: &str) -> String {
        self.elements
            .get(id)
            .map(|element| element.open_tag(id))
            .unwrap_or_default()
    }

    fn close(&self, id: &str) -> String {
        self.elements
            .get(id)
            .map(|element| format!("</{}>", element.tag))
            .unwrap_or_default()
    }

    fn full(&self, id: &str) -> String {
        let inner = self.element(id).map(Element::inner_html).unwrap_or_default();
        format!("{}{inner}{}", self.open(id), self.close(id))
    }

    fn sort_options(&self) -> String {
        let selected = self.element("sortSelect").and_then(Element::value);
        SORT_OPTIONS
            .iter()
            .map(|(value, label)| {
                let marker = if selected == Some(*value) { " selected" } else { "" };
                format!(r#"<option value="{value}"{marker}>{label}</option>"#)
            })
            .collect()
    }

    /// The whole page. Actions are exposed as `data-action` attributes; no
    /// script is embedded.
    pub fn to_html(&self) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>News Portal</title>
<link rel="manifest" href="./manifest.json">
<link rel="stylesheet" href="./src/style.css">
</head>
<body>
{loading}
{error_open}{error_text}<button class="error-close" data-action="hide-error">&times;</button>{error_close}
{app_open}
<header class="header">
<nav class="nav">{nav_home}{nav_all}</nav>
<div class="search-container">{input}<button class="search-btn" data-action="search">Search</button>{results}</div>
</header>
<main>
{home_open}<h2>Featured</h2>{featured}<h2>Latest news</h2>{latest}{home_close}
{all_open}<h2>All news</h2>{sort_open}{options}{sort_close}{all_grid}{load_more}{all_close}
{search_open}{search_query}{search_grid}{search_close}
{detail_open}{detail}{detail_close}
</main>
{app_close}
</body>
</html>
"#,
            loading = self.full("loading"),
            error_open = self.open("errorMessage"),
            error_text = self.full("errorText"),
            error_close = self.close("errorMessage"),
            app_open = self.open("app"),
            nav_home = self.full("navHome"),
            nav_all = self.full("navAll"),
            input = self.open("searchInput"),
            results = self.full("searchResults"),
            home_open = self.open("homePage"),
            featured = self.full("featuredNewsGrid"),
            latest = self.full("latestNewsGrid"),
            home_close = self.close("homePage"),
            all_open = self.open("allNewsPage"),
            sort_open = self.open("sortSelect"),
            options = self.sort_options(),
            sort_close = self.close("sortSelect"),
            all_grid = self.full("allNewsGrid"),
            load_more = self.full("loadMoreBtn"),
            all_close = self.close("allNewsPage"),
            search_open = self.open("searchPage"),
            search_query = self.full("searchQuery"),
            search_grid = self.full("searchResultsGrid"),
            search_close = self.close("searchPage"),
            detail_open = self.open("newsDetailPage"),
            detail = self.full("newsDetail"),
            detail_close = self.close("newsDetailPage"),
            app_close = self.close("app"),
        )
    }
}

impl Document for HtmlDocument {
    fn set_inner_html(&mut self, id: &str, html: String) {
        if let Some(element) = self.elements.get_mut(id) {
            element.inner_html = html;
        }
    }

    fn set_text(&mut self, id: &str, text: &str) {
        self.set_inner_html(id, encode_text(text).into_owned());
    }

    fn set_class(&mut self, id: &str, class: &str, on: bool) {
        if let Some(element) = self.elements.get_mut(id) {
            if on {
                element.classes.insert(class.to_string());
            } else {
                element.classes.remove(class);
            }
        }
    }

    fn set_visible(&mut self, id: &str, visible: bool) {
        if let Some(element) = self.elements.get_mut(id) {
            element.visible = visible;
        }
    }

    fn set_value(&mut self, id: &str, value: &str) {
        if let Some(element) = self.elements.get_mut(id) {
            element.value = Some(value.to_string());
        }
    }

    fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portal_starts_loading() {
        let doc = HtmlDocument::portal();
        assert!(doc.element("loading").unwrap().is_visible());
        assert!(!doc.element("app").unwrap().is_visible());
        assert!(doc.element("homePage").unwrap().has_class("active"));
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let mut doc = HtmlDocument::portal();
        let before = doc.clone();
        doc.set_inner_html("nope", "x".to_string());
        doc.set_visible("nope", false);
        assert_eq!(doc, before);
        assert!(doc.element("nope").is_none());
    }

    #[test]
    fn test_set_text_escapes() {
        let mut doc = HtmlDocument::portal();
        doc.set_text("errorText", "<oops>");
        assert_eq!(doc.element("errorText").unwrap().inner_html(), "&lt;oops&gt;");
    }

    #[test]
    fn test_to_html_reflects_state() {
        let mut doc = HtmlDocument::portal();
        doc.set_visible("loading", false);
        doc.set_visible("app", true);
        doc.set_inner_html("featuredNewsGrid", "<article>hi</article>".to_string());
        doc.set_value("sortSelect", "title");
        doc.set_value("searchInput", r#"say "hi""#);

        let html = doc.to_html();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<div id="loading" class="loading" style="display: none">"#));
        assert!(html.contains(r#"<div id="app" class="app">"#));
        assert!(html.contains(r#"<input id="searchInput" type="search""#));
        assert!(html.contains("<article>hi</article>"));
        assert!(html.contains(r#"<option value="title" selected>"#));
        assert!(html.contains(r#"value="say &quot;hi&quot;""#));
        assert!(html.contains(r#"data-action="more""#));
    }
}
