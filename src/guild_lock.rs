use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async lock per guild.
///
/// The gateway hands every event to its own task, so a create and a delete
/// for the same post can run side by side. Handlers that read or write a
/// guild's intro state hold its lock for the whole read-modify-write.
#[derive(Clone, Default)]
pub struct GuildLocks {
    locks: Arc<Mutex<HashMap<u64, Arc<AsyncMutex<()>>>>>,
}

impl GuildLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, guild_id: u64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.entry(guild_id).or_default().clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_guild_waits() {
        let locks = GuildLocks::new();
        let guard = locks.lock(1).await;

        let waiting = tokio::time::timeout(Duration::from_millis(50), locks.lock(1)).await;
        assert!(waiting.is_err(), "second lock on a held guild should wait");

        drop(guard);
        let relocked = tokio::time::timeout(Duration::from_millis(50), locks.lock(1)).await;
        assert!(relocked.is_ok());
    }

    #[tokio::test]
    async fn test_guilds_are_independent() {
        let locks = GuildLocks::new();
        let _first = locks.lock(1).await;

        let other = tokio::time::timeout(Duration::from_millis(50), locks.lock(2)).await;
        assert!(other.is_ok());
    }
}
