use core_runtime::config::AppConfig;
use tracing::debug;

use crate::lock::{lock_path, running_pid, send_terminate};

pub struct Cancel;

impl Cancel {
    pub fn execute(config: &AppConfig) -> anyhow::Result<()> {
        let path = lock_path(&config.cache.movies_cache);
        debug!(path = %path.display(), "Looking for a running sync");

        let Some(pid) = running_pid(&path) else {
            println!("❌ No sync operations currently running");
            return Ok(());
        };

        send_terminate(pid)?;
        println!("🛑 Sent cancel signal to sync process (PID: {})", pid);
        println!("✅ Cancel signal sent. The sync will stop gracefully.");
        Ok(())
    }
}
