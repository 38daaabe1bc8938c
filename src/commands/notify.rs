use anyhow::Context;
use shellcache::{Notification, PushPayload, RouterConfig};

use crate::config::Settings;

/// Show the notification a push payload produces. With `click`, act on a
/// click: an empty action is a click on the notification body.
pub(crate) fn cmd_notify(settings: &Settings, payload: &str, click: Option<&str>) -> anyhow::Result<()> {
    let payload: PushPayload = serde_json::from_str(payload).context("invalid push payload")?;
    let config = RouterConfig::new(&settings.cache_version, settings.app.clone(), &settings.api)?;
    let notification = Notification::from_push(payload, &config);

    let Some(action) = click else {
        println!("{}", serde_json::to_string_pretty(&notification)?);
        return Ok(());
    };
    let action = Some(action).filter(|a| !a.is_empty());
    match notification.click(action) {
        Some(url) => {
            println!("{url}");
            open::that(url.as_str()).map_err(|e| anyhow::anyhow!("Could not open URL: {}", e))?;
        }
        None => eprintln!("Notification closed"),
    }
    Ok(())
}
