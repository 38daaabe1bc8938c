use shellcache::{Disconnected, HttpNetwork, Network};

use crate::config::Settings;

pub(crate) fn network(settings: &Settings) -> anyhow::Result<Box<dyn Network>> {
    if settings.offline {
        return Ok(Box::new(Disconnected));
    }
    let client = HttpNetwork::new(&format!("newsdesk/{}", env!("CARGO_PKG_VERSION")))
        .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {}", e))?;
    Ok(Box::new(client))
}
