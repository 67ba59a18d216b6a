use crate::db::{Database, GuildConfig, Result};

/// Async access to per-guild channel settings. Writes hit the database
/// immediately so the next gateway event sees them.
#[derive(Clone)]
pub struct GuildConfigStore {
    db: Database,
}

impl GuildConfigStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn get(&self, guild_id: u64) -> Result<GuildConfig> {
        self.db
            .run_blocking(move |db| db.get_guild_config(guild_id))
            .await
    }

    pub async fn get_intro_channel(&self, guild_id: u64) -> Result<Option<u64>> {
        self.db
            .run_blocking(move |db| db.get_intro_channel(guild_id))
            .await
    }

    pub async fn get_log_channel(&self, guild_id: u64) -> Result<Option<u64>> {
        self.db
            .run_blocking(move |db| db.get_log_channel(guild_id))
            .await
    }

    pub async fn set_intro_channel(&self, guild_id: u64, channel_id: u64) -> Result<()> {
        self.db
            .run_blocking(move |db| db.set_intro_channel(guild_id, channel_id))
            .await
    }

    pub async fn set_log_channel(&self, guild_id: u64, channel_id: u64) -> Result<()> {
        self.db
            .run_blocking(move |db| db.set_log_channel(guild_id, channel_id))
            .await
    }
}
