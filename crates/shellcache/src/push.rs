//! Push payloads turned into system notifications, and what a click opens.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::RouterConfig;

const ICON: &str = "./public/icon-192x192.png";
const BADGE: &str = "./public/icon-72x72.png";
const VIBRATE: [u32; 3] = [100, 50, 100];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PushPayload {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationAction {
    pub action: &'static str,
    pub title: &'static str,
    pub icon: Option<Url>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: Url,
    pub badge: Url,
    pub vibrate: Vec<u32>,
    /// Where a click leads.
    pub data: Url,
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    pub fn from_push(payload: PushPayload, config: &RouterConfig) -> Self {
        let base = &config.app_base;
        let resolve = |path: &str| base.join(path).unwrap_or_else(|_| base.clone());
        let data = payload
            .url
            .as_deref()
            .and_then(|url| base.join(url).ok())
            .unwrap_or_else(|| base.clone());
        Self {
            title: payload.title,
            body: payload.body,
            icon: resolve(ICON),
            badge: resolve(BADGE),
            vibrate: VIBRATE.to_vec(),
            data,
            actions: vec![
                NotificationAction {
                    action: "explore",
                    title: "Open",
                    icon: Some(resolve(ICON)),
                },
                NotificationAction {
                    action: "close",
                    title: "Close",
                    icon: None,
                },
            ],
        }
    }

    /// The window a click opens: the body itself or the `explore` action open
    /// [`Notification::data`]; `close` and unknown actions open nothing.
    pub fn click(&self, action: Option<&str>) -> Option<&Url> {
        match action {
            None | Some("explore") => Some(&self.data),
            Some(_) => None,
        }
    }
}
