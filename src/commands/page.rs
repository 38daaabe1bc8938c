use std::fs;
use std::io::IsTerminal;

use anyhow::Context;
use chrono::Local;
use clap::Args;

use crate::config::Settings;
use crate::news::api::Endpoints;
use crate::store::Store;
use crate::view::{Action, HtmlDocument, Route, ViewController};

/// How a page is shown.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct PageArgs {
    /// Print the full HTML document instead of the text outline
    #[arg(long)]
    html: bool,
    /// Write the HTML document to the store and open it in a browser
    #[arg(long, conflicts_with = "html")]
    open: bool,
}

/// Register the router, load the news through it and show the portal home
/// page. On a failed load the error page is still returned alongside the
/// error.
pub(crate) fn load_portal(
    store: &Store,
    settings: &Settings,
) -> anyhow::Result<(ViewController<HtmlDocument>, Option<anyhow::Error>)> {
    let mut router = store.router(settings)?;
    super::register(store, settings, &mut router)?;
    let endpoints = Endpoints::new(&settings.api)?;

    let sp = super::spinner("Loading news...");
    let mut controller = ViewController::new(HtmlDocument::portal());
    let loaded = controller.load(&router, &endpoints, Local::now().date_naive());
    sp.finish_and_clear();

    let failure = loaded
        .err()
        .map(|e| anyhow::Error::new(e).context("Failed to load data"));
    Ok((controller, failure))
}

pub(crate) fn cmd_page(
    store: &Store,
    settings: &Settings,
    route: Route,
    steps: Vec<Action>,
    args: &PageArgs,
) -> anyhow::Result<()> {
    let (mut controller, failure) = load_portal(store, settings)?;
    if let Some(e) = failure {
        if args.html || args.open {
            show(store, &controller, args)?;
        }
        return Err(e);
    }

    controller.navigate(route)?;
    let now = std::time::Instant::now();
    for step in steps {
        controller.dispatch(step, now);
    }
    show(store, &controller, args)
}

fn show(store: &Store, controller: &ViewController<HtmlDocument>, args: &PageArgs) -> anyhow::Result<()> {
    if args.open {
        let path = store.page_path();
        fs::create_dir_all(store.root())
            .with_context(|| format!("failed to create {}", store.root().display()))?;
        fs::write(&path, controller.document().to_html())
            .with_context(|| format!("failed to write {}", path.display()))?;
        open::that(&path).map_err(|e| anyhow::anyhow!("Could not open {}: {}", path.display(), e))?;
        eprintln!("Opened {}", path.display());
    } else if args.html {
        print!("{}", controller.document().to_html());
    } else {
        let color = std::io::stdout().is_terminal();
        print!("{}", super::outline::render(controller, color));
    }
    Ok(())
}
