mod commands;
mod config;
mod error;
mod http;
mod news;
mod store;
mod view;

use std::io::IsTerminal;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::cache::CacheCommand;
use commands::page::PageArgs;
use config::Settings;
use store::Store;
use view::{Action, Route, SortKey};

/// A terminal news portal that keeps working offline
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(flatten)]
    settings: Settings,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Featured and latest news (default)
    Home {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Every post, sorted, six more per page
    All {
        #[arg(long, default_value = "newest")]
        sort: SortKey,
        /// How many pages to show; earlier pages are included
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
        #[command(flatten)]
        output: PageArgs,
    },
    /// Posts whose title, body or author matches QUERY
    Search {
        query: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// One post in full
    Show {
        id: u32,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Navigate the portal interactively from stdin
    Browse,
    /// Inspect and manage the response cache
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
    /// Render a push payload as a notification
    Notify {
        /// JSON payload: {"title": ..., "body": ..., "url": ...}
        payload: String,
        /// Click the notification, optionally on an action (explore, close)
        #[arg(long, num_args = 0..=1, default_missing_value = "")]
        click: Option<String>,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("NEWS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging();

    let settings = args.settings;
    let store = Store::new(settings.store_dir());

    match args.command {
        None => commands::page::cmd_page(&store, &settings, Route::Home, Vec::new(), &PageArgs::default()),
        Some(Command::Home { page }) => {
            commands::page::cmd_page(&store, &settings, Route::Home, Vec::new(), &page)
        }
        Some(Command::All { sort, page, output }) => {
            let steps = vec![Action::Sort(sort), Action::Page(page as usize)];
            commands::page::cmd_page(&store, &settings, Route::AllNews, steps, &output)
        }
        Some(Command::Search { query, page }) => {
            let steps = vec![Action::Submit(Some(query))];
            commands::page::cmd_page(&store, &settings, Route::Home, steps, &page)
        }
        Some(Command::Show { id, page }) => {
            commands::page::cmd_page(&store, &settings, Route::Detail(id), Vec::new(), &page)
        }
        Some(Command::Browse) => commands::browse::cmd_browse(&store, &settings),
        Some(Command::Cache { command }) => commands::cache::cmd_cache(&store, &settings, command),
        Some(Command::Notify { payload, click }) => {
            commands::notify::cmd_notify(&settings, &payload, click.as_deref())
        }
    }
}
