use super::{from_sql_id, sql_id, Database, Result};
use rusqlite::{params, OptionalExtension};

/// Per-guild channel settings. `None` means the channel was never set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuildConfig {
    pub guild_id: u64,
    pub intro_channel_id: Option<u64>,
    pub log_channel_id: Option<u64>,
}

const UPSERT_INTRO_CHANNEL: &str = "
    INSERT INTO guild_config (guild_id, intro_channel_id, updated_at)
    VALUES (?1, ?2, CURRENT_TIMESTAMP)
    ON CONFLICT(guild_id) DO UPDATE SET intro_channel_id = ?2, updated_at = CURRENT_TIMESTAMP";

const UPSERT_LOG_CHANNEL: &str = "
    INSERT INTO guild_config (guild_id, log_channel_id, updated_at)
    VALUES (?1, ?2, CURRENT_TIMESTAMP)
    ON CONFLICT(guild_id) DO UPDATE SET log_channel_id = ?2, updated_at = CURRENT_TIMESTAMP";

impl Database {
    pub fn get_guild_config(&self, guild_id: u64) -> Result<GuildConfig> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT intro_channel_id, log_channel_id FROM guild_config WHERE guild_id = ?1",
                [sql_id(guild_id)],
                |row| Ok((row.get::<_, Option<i64>>(0)?, row.get::<_, Option<i64>>(1)?)),
            )
            .optional()?;

        let (intro, log) = row.unwrap_or((None, None));
        Ok(GuildConfig {
            guild_id,
            intro_channel_id: channel_from_sql(intro),
            log_channel_id: channel_from_sql(log),
        })
    }

    pub fn get_intro_channel(&self, guild_id: u64) -> Result<Option<u64>> {
        Ok(self.get_guild_config(guild_id)?.intro_channel_id)
    }

    pub fn get_log_channel(&self, guild_id: u64) -> Result<Option<u64>> {
        Ok(self.get_guild_config(guild_id)?.log_channel_id)
    }

    /// Upsert the introduction channel. A channel id of `0` clears it.
    pub fn set_intro_channel(&self, guild_id: u64, channel_id: u64) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(UPSERT_INTRO_CHANNEL, params![sql_id(guild_id), channel_to_sql(channel_id)])?;
        Ok(())
    }

    /// Upsert the moderation log channel. A channel id of `0` clears it.
    pub fn set_log_channel(&self, guild_id: u64, channel_id: u64) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(UPSERT_LOG_CHANNEL, params![sql_id(guild_id), channel_to_sql(channel_id)])?;
        Ok(())
    }
}

fn channel_to_sql(channel_id: u64) -> Option<i64> {
    (channel_id != 0).then(|| sql_id(channel_id))
}

fn channel_from_sql(value: Option<i64>) -> Option<u64> {
    value.filter(|id| *id != 0).map(from_sql_id)
}

#[cfg(test)]
mod tests {
    use crate::db::test_db;

    #[test]
    fn test_unset_guild_defaults() {
        let db = test_db();
        let config = db.get_guild_config(123).unwrap();
        assert_eq!(config.guild_id, 123);
        assert_eq!(config.intro_channel_id, None);
        assert_eq!(config.log_channel_id, None);
    }

    #[test]
    fn test_channel_round_trip() {
        let db = test_db();

        db.set_intro_channel(1, 555).unwrap();
        assert_eq!(db.get_intro_channel(1).unwrap(), Some(555));
        assert_eq!(db.get_log_channel(1).unwrap(), None);

        db.set_log_channel(1, 777).unwrap();
        assert_eq!(db.get_intro_channel(1).unwrap(), Some(555)); // Untouched
        assert_eq!(db.get_log_channel(1).unwrap(), Some(777));

        // Idempotent upsert
        db.set_log_channel(1, 777).unwrap();
        db.set_intro_channel(1, 556).unwrap();
        assert_eq!(db.get_intro_channel(1).unwrap(), Some(556));
        assert_eq!(db.get_log_channel(1).unwrap(), Some(777));
    }

    #[test]
    fn test_zero_clears_channel() {
        let db = test_db();
        db.set_intro_channel(1, 555).unwrap();
        db.set_intro_channel(1, 0).unwrap();
        assert_eq!(db.get_intro_channel(1).unwrap(), None);
    }

    #[test]
    fn test_guilds_are_isolated() {
        let db = test_db();
        db.set_intro_channel(1, 10).unwrap();
        db.set_log_channel(2, 20).unwrap();

        assert_eq!(db.get_log_channel(1).unwrap(), None);
        assert_eq!(db.get_intro_channel(2).unwrap(), None);
        assert_eq!(db.get_intro_channel(1).unwrap(), Some(10));
        assert_eq!(db.get_log_channel(2).unwrap(), Some(20));
    }
}
