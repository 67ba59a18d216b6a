use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    /// Users allowed to run the admin commands. The application owner is
    /// always added on startup.
    pub owner_ids: Vec<u64>,
    pub database_url: String,
    pub command_prefix: String,
    /// Members with this role are recorded but never reported.
    pub staff_role_name: String,
    pub status_message: String,
    pub footer_text: String,
    pub allowed_intro_posts: usize,
    pub backfill_default_limit: usize,
    /// Link lists longer than this are sent as a text attachment.
    pub report_inline_limit: usize,
    pub message_cache_size: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::build()
    }

    fn build() -> anyhow::Result<Self> {
        Ok(Config {
            discord_token: env::var("DISCORD_TOKEN")
                .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN must be set"))?,
            owner_ids: parse_id_list(&env::var("OWNER_IDS").unwrap_or_default())?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "data/introwatch.db".to_string()),
            command_prefix: env::var("COMMAND_PREFIX").unwrap_or_else(|_| "i! ".to_string()),
            staff_role_name: env::var("STAFF_ROLE_NAME").unwrap_or_else(|_| "Staff".to_string()),
            status_message: env::var("STATUS_MESSAGE")
                .unwrap_or_else(|_| "over the introductions".to_string()),
            footer_text: env::var("FOOTER_TEXT").unwrap_or_else(|_| "Intro watch".to_string()),
            allowed_intro_posts: env::var("ALLOWED_INTRO_POSTS")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .unwrap_or(1),
            backfill_default_limit: env::var("BACKFILL_DEFAULT_LIMIT")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()
                .unwrap_or(2000),
            report_inline_limit: env::var("REPORT_INLINE_LIMIT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .unwrap_or(5000),
            message_cache_size: env::var("MESSAGE_CACHE_SIZE")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap_or(1000),
        })
    }
}

fn parse_id_list(raw: &str) -> anyhow::Result<Vec<u64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .map_err(|_| anyhow::anyhow!("OWNER_IDS entry '{}' is not a valid user id", s))
        })
        .collect()
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"[REDACTED]")
            .field("owner_ids", &self.owner_ids)
            .field("database_url", &self.database_url)
            .field("command_prefix", &self.command_prefix)
            .field("staff_role_name", &self.staff_role_name)
            .field("status_message", &self.status_message)
            .field("footer_text", &self.footer_text)
            .field("allowed_intro_posts", &self.allowed_intro_posts)
            .field("backfill_default_limit", &self.backfill_default_limit)
            .field("report_inline_limit", &self.report_inline_limit)
            .field("message_cache_size", &self.message_cache_size)
            .finish()
    }
}

/// Embed field values are capped at 1024 characters
pub const DISCORD_FIELD_LIMIT: usize = 1024;

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        discord_token: "test_token".to_string(),
        owner_ids: vec![],
        database_url: ":memory:".to_string(),
        command_prefix: "i! ".to_string(),
        staff_role_name: "Staff".to_string(),
        status_message: "over the introductions".to_string(),
        footer_text: "Intro watch".to_string(),
        allowed_intro_posts: 1,
        backfill_default_limit: 2000,
        report_inline_limit: 5000,
        message_cache_size: 100,
    }
}
