use std::fs;
use std::io::BufRead;
use std::path::Path;

use assert_cmd::Command;
use httpmock::prelude::*;
use tempfile::TempDir;

const POSTS: &str = r#"[
    {"userId":1,"id":1,"title":"Rust ships","body":"The compiler got faster. Everyone cheered"},
    {"userId":2,"id":2,"title":"apple harvest","body":"Orchards are full"},
    {"userId":9,"id":3,"title":"Apple earnings","body":"Numbers went up"},
    {"userId":1,"id":4,"title":"Fourth","body":"Four"},
    {"userId":1,"id":5,"title":"Fifth","body":"Five"},
    {"userId":1,"id":6,"title":"Sixth","body":"Six"},
    {"userId":1,"id":7,"title":"Seventh","body":"Seven"}
]"#;

const USERS: &str = r#"[
    {"id":1,"name":"Leanne Graham","email":"leanne@example.com"},
    {"id":2,"name":"Ervin Howell","email":"ervin@example.com"}
]"#;

const SHELL_PATHS: [&str; 7] = [
    "/",
    "/index.html",
    "/src/main.js",
    "/src/style.css",
    "/manifest.json",
    "/public/icon-192x192.png",
    "/public/icon-512x512.png",
];

fn read_urls(dir: &Path) -> Vec<String> {
    let mut urls = Vec::new();
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if let Some(fname) = path.file_name().and_then(|f| f.to_str())
                && fname.starts_with("items_")
                && fname.ends_with(".jsonl")
            {
                let file = fs::File::open(&path).unwrap();
                for line in std::io::BufReader::new(file).lines() {
                    let line = line.unwrap();
                    if !line.trim().is_empty() {
                        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
                        urls.push(value["url"].as_str().unwrap().to_string());
                    }
                }
            }
        }
    }
    urls.sort();
    urls
}

struct TestContext {
    dir: TempDir,
    api: MockServer,
    app: MockServer,
}

impl TestContext {
    fn new() -> Self {
        let ctx = Self {
            dir: TempDir::new().unwrap(),
            api: MockServer::start(),
            app: MockServer::start(),
        };
        ctx.mock_json(&ctx.api, "/posts", POSTS);
        ctx.mock_json(&ctx.api, "/users", USERS);
        for path in SHELL_PATHS {
            ctx.app.mock(|when, then| {
                when.method(GET).path(path);
                then.status(200).body(format!("shell {path}"));
            });
        }
        ctx
    }

    fn mock_json(&self, server: &MockServer, path: &str, body: &str) {
        server.mock(|when, then| {
            when.method(GET).path(path);
            then.status(200)
                .header("Content-Type", "application/json")
                .body(body);
        });
    }

    fn partition(&self, name: &str) -> Vec<String> {
        read_urls(&self.dir.path().join("caches").join(name))
    }

    fn partitions(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.dir.path().join("caches"))
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    fn run_version(&self, version: &str, args: &[&str]) -> assert_cmd::assert::Assert {
        #[allow(deprecated)]
        Command::cargo_bin("news")
            .unwrap()
            .args(args)
            .env("NEWS_STORE", self.dir.path())
            .env("NEWS_API", self.api.base_url())
            .env("NEWS_APP", self.app.url("/"))
            .env("NEWS_CACHE_VERSION", version)
            .env_remove("NEWS_LOG")
            .write_stdin("")
            .assert()
    }

    fn run(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.run_version("1", args)
    }
}

fn stdout(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stdout).into_owned()
}

fn stderr(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stderr).into_owned()
}

#[test]
fn test_home_renders_and_registers_router() {
    let ctx = TestContext::new();
    let assert = ctx.run(&[]).success();

    let out = stdout(&assert);
    assert!(out.starts_with("=== Featured ===\n"));
    assert!(out.contains("#1 Rust ships (Leanne Graham)"));
    assert!(out.contains("#3 Apple earnings (Unknown author)"));
    assert!(out.contains("=== Latest news ==="));

    let registration: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(ctx.dir.path().join("registration.json")).unwrap())
            .unwrap();
    assert_eq!(registration["active"], "1");
    assert_eq!(registration["controlling"], true);
    assert_eq!(ctx.partition("newsportal-static-v1").len(), SHELL_PATHS.len());
    assert_eq!(
        ctx.partition("newsportal-dynamic-v1"),
        vec![ctx.api.url("/posts"), ctx.api.url("/users")]
    );
}

#[test]
fn test_offline_render_uses_cached_api_responses() {
    let ctx = TestContext::new();
    ctx.run(&["home"]).success();

    let assert = ctx.run(&["--offline", "home"]).success();
    assert!(stdout(&assert).contains("#1 Rust ships"));
}

#[test]
fn test_offline_without_cache_fails_with_banner() {
    let ctx = TestContext::new();
    let assert = ctx.run(&["--offline", "home"]).failure();
    assert!(stderr(&assert).contains("Failed to load data"));
    assert!(stdout(&assert).is_empty());
}

#[test]
fn test_offline_failure_still_prints_error_page_as_html() {
    let ctx = TestContext::new();
    let assert = ctx.run(&["--offline", "home", "--html"]).failure();
    let html = stdout(&assert);
    assert!(html.contains(r#"<div id="errorMessage" class="error-message">"#));
    assert!(html.contains("Failed to load data:"));
}

#[test]
fn test_new_version_purges_old_partitions() {
    let ctx = TestContext::new();
    ctx.run_version("1", &["home"]).success();
    assert_eq!(
        ctx.partitions(),
        vec!["newsportal-dynamic-v1", "newsportal-static-v1"]
    );

    let assert = ctx.run_version("2", &["home"]).success();
    assert!(stderr(&assert).contains("Removed old cache newsportal-static-v1"));
    assert_eq!(
        ctx.partitions(),
        vec!["newsportal-dynamic-v2", "newsportal-static-v2"]
    );
}

#[test]
fn test_offline_version_bump_keeps_serving_active_version() {
    let ctx = TestContext::new();
    ctx.run_version("1", &["home"]).success();

    let assert = ctx.run_version("2", &["--offline", "home"]).success();
    assert!(stdout(&assert).contains("#1 Rust ships"));
    assert!(stderr(&assert).contains("Could not install version 2; staying on version 1"));
    let partitions = ctx.partitions();
    assert!(partitions.contains(&"newsportal-dynamic-v1".to_string()));
    assert!(partitions.contains(&"newsportal-static-v1".to_string()));
    let registration: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(ctx.dir.path().join("registration.json")).unwrap())
            .unwrap();
    assert_eq!(registration["active"], "1");

    let assert = ctx.run_version("2", &["home"]).success();
    assert!(stderr(&assert).contains("Removed old cache newsportal-dynamic-v1"));
    assert!(!ctx.partitions().contains(&"newsportal-dynamic-v1".to_string()));
}

#[test]
fn test_huge_page_is_clamped() {
    let ctx = TestContext::new();
    let assert = ctx.run(&["all", "--page", "4294967295"]).success();
    let out = stdout(&assert);
    assert!(out.contains("#7 Seventh"));
    assert!(!out.contains("for more"));
}

#[test]
fn test_diagnostics_are_plain_when_piped() {
    let ctx = TestContext::new();
    let assert = ctx.run(&["--offline", "home"]).failure();
    let err = stderr(&assert);
    assert!(err.contains("WARN"));
    assert!(!err.contains('\x1b'));
}

#[test]
fn test_all_news_html_with_sort_and_pages() {
    let ctx = TestContext::new();
    let assert = ctx
        .run(&["all", "--sort", "title", "--page", "1", "--html"])
        .success();
    let html = stdout(&assert);
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains(r#"<option value="title" selected>"#));
    assert!(html.contains(r#"<section id="allNewsPage" class="active page">"#));
    assert!(html.contains(r#"data-action="more""#));
    assert_eq!(html.matches(r#"class="news-card""#).count(), 6);

    let assert = ctx.run(&["all", "--page", "2"]).success();
    let out = stdout(&assert);
    assert!(out.contains("=== All news (newest) ==="));
    assert!(out.contains("#7 Seventh"));
    assert!(!out.contains("for more"));
}

#[test]
fn test_all_news_outline_offers_more() {
    let ctx = TestContext::new();
    let assert = ctx.run(&["all", "--sort", "oldest"]).success();
    let out = stdout(&assert);
    assert!(out.contains("Showing 6 of 7. Use --page 2 for more."));
    let first = out.lines().find(|l| l.contains('#')).unwrap();
    assert!(first.contains("#7 Seventh"));
}

#[test]
fn test_search_lists_matches() {
    let ctx = TestContext::new();
    let assert = ctx.run(&["search", "apple"]).success();
    let out = stdout(&assert);
    assert!(out.contains("=== Search: \"apple\" (2 results) ==="));
    assert!(out.contains("#2 apple harvest"));
    assert!(out.contains("#3 Apple earnings"));
}

#[test]
fn test_show_post_and_unknown_post() {
    let ctx = TestContext::new();
    let assert = ctx.run(&["show", "1"]).success();
    let out = stdout(&assert);
    assert!(out.contains("Rust ships\nBy Leanne Graham on "));
    assert!(out.contains("The compiler got faster. Everyone cheered."));

    let assert = ctx.run(&["show", "99"]).failure();
    assert!(stderr(&assert).contains("no post with id 99"));
}

#[test]
fn test_browse_reads_actions_from_stdin() {
    let ctx = TestContext::new();
    #[allow(deprecated)]
    let assert = Command::cargo_bin("news")
        .unwrap()
        .arg("browse")
        .env("NEWS_STORE", ctx.dir.path())
        .env("NEWS_API", ctx.api.base_url())
        .env("NEWS_APP", ctx.app.url("/"))
        .env("NEWS_CACHE_VERSION", "1")
        .write_stdin("search apple\nshow 2\nback\nfly\nquit\nshow 1\n")
        .assert()
        .success();

    let out = stdout(&assert);
    assert_eq!(out.matches("=== Search: \"apple\" (2 results) ===").count(), 2);
    assert!(out.contains("apple harvest\nBy Ervin Howell"));
    assert!(!out.contains("Rust ships\nBy"));
    assert!(stderr(&assert).contains("unknown action \"fly\""));
}

#[test]
fn test_cache_ls_lists_partitions_and_entries() {
    let ctx = TestContext::new();
    ctx.run_version("1", &["home"]).success();

    let assert = ctx.run_version("1", &["cache", "ls"]).success();
    let out = stdout(&assert);
    assert!(out.starts_with("installing: -  waiting: -  active: 1 (controlling)\n"));
    assert!(out.contains("* newsportal-dynamic-v1 (2 entries)"));
    assert!(out.contains("* newsportal-static-v1 (7 entries)"));
    assert!(out.contains(&format!("    {}", ctx.api.url("/posts"))));
}

#[test]
fn test_cache_install_then_activate() {
    let ctx = TestContext::new();
    let assert = ctx.run(&["cache", "activate"]).failure();
    assert!(stderr(&assert).contains("version 1 has not been installed"));

    let assert = ctx.run(&["cache", "install"]).success();
    assert!(stderr(&assert).contains("Cached 7 of 7 shell files; version 1 is waiting"));

    let assert = ctx.run(&["cache", "skip-waiting"]).success();
    assert!(stderr(&assert).contains("Version 1 is active"));

    let assert = ctx.run(&["cache", "skip-waiting"]).success();
    assert!(stderr(&assert).contains("No version is waiting"));
}

#[test]
fn test_cache_add_is_all_or_nothing() {
    let ctx = TestContext::new();
    ctx.mock_json(&ctx.app, "/extra.json", "{}");

    let assert = ctx.run(&["cache", "add", "extra.json"]).success();
    assert_eq!(
        stdout(&assert).trim(),
        format!("Cached {}", ctx.app.url("/extra.json"))
    );
    assert_eq!(ctx.partition("newsportal-dynamic-v1"), vec![ctx.app.url("/extra.json")]);

    ctx.run(&["cache", "add", "/more.json", "/missing.json"]).failure();
    ctx.mock_json(&ctx.app, "/more.json", "[]");
    ctx.run(&["cache", "add", "/more.json", "/missing.json"]).failure();
    assert_eq!(ctx.partition("newsportal-dynamic-v1"), vec![ctx.app.url("/extra.json")]);
}

#[test]
fn test_cache_fetch_falls_back_offline() {
    let ctx = TestContext::new();
    let posts = ctx.api.url("/posts");

    let assert = ctx.run(&["--offline", "cache", "fetch", &posts]).success();
    assert!(stderr(&assert).contains("503 Service Unavailable (Api)"));
    assert!(stdout(&assert).contains(r#""error":"Offline""#));

    ctx.run(&["cache", "fetch", &posts]).success();
    let assert = ctx.run(&["--offline", "cache", "fetch", &posts]).success();
    assert!(stdout(&assert).contains("Rust ships"));

    let page = ctx.app.url("/news/1");
    let assert = ctx.run(&["--offline", "cache", "fetch", &page, "--navigate"]).success();
    assert!(stderr(&assert).contains("503 Service Unavailable (Navigation)"));
    assert!(stdout(&assert).contains("No internet connection"));
}

#[test]
fn test_notify_renders_and_closes() {
    let ctx = TestContext::new();
    let payload = r#"{"title":"Breaking","body":"Read on","url":"/news/1"}"#;

    let assert = ctx.run(&["notify", payload]).success();
    let notification: serde_json::Value = serde_json::from_str(&stdout(&assert)).unwrap();
    assert_eq!(notification["title"], "Breaking");
    assert_eq!(notification["data"], ctx.app.url("/news/1"));
    assert_eq!(notification["actions"][0]["action"], "explore");
    assert_eq!(notification["vibrate"], serde_json::json!([100, 50, 100]));

    let assert = ctx.run(&["notify", payload, "--click", "close"]).success();
    assert!(stdout(&assert).is_empty());
    assert!(stderr(&assert).contains("Notification closed"));

    ctx.run(&["notify", "not json"]).failure();
}
