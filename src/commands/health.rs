use anyhow::Context;
use core_runtime::config::AppConfig;

use crate::commands::connect;

pub struct Health;

impl Health {
    pub async fn execute(config: &AppConfig) -> anyhow::Result<()> {
        let server = connect(config)?;
        let status = server
            .server_status()
            .await
            .with_context(|| format!("Bazarr is not reachable at {}", config.base_url()))?;

        println!("✅ Connected to Bazarr {} at {}", status.version, config.base_url());
        Ok(())
    }
}
