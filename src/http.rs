use std::time::Duration;

use reqwest::Client;

use crate::config::Config;
use crate::error::Result;

const USER_AGENT: &str = concat!("boost-release-sync/", env!("CARGO_PKG_VERSION"));

pub fn build_client(request_timeout: Duration, connect_timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(request_timeout)
        .connect_timeout(connect_timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;
    Ok(client)
}

pub fn client_from_config(config: &Config) -> Result<Client> {
    build_client(
        Duration::from_secs(config.request_timeout_secs),
        Duration::from_secs(config.connect_timeout_secs),
    )
}
