pub mod cache;
pub mod commands;
pub mod config;
pub mod db;
pub mod deletions;
pub mod events;
pub mod guild_lock;
pub mod intake;
pub mod policy;
pub mod report;
pub mod services;

/// Custom data passed to all commands and event handlers
pub struct Data {
    pub config: config::Config,
    pub ledger: services::intro_ledger::IntroLedger,
    pub guild_config: services::guild_config::GuildConfigStore,
    pub policy: policy::IntroPolicy,
    pub cache: cache::MessageCache,
    /// Serializes intro-channel state changes per guild
    pub guild_locks: guild_lock::GuildLocks,
    pub report_footer: report::ReportFooter,
    /// Bot's own user ID for mention detection
    pub bot_id: u64,
}

impl Data {
    pub fn new(config: config::Config, db: db::Database, report_footer: report::ReportFooter, bot_id: u64) -> Self {
        Self {
            ledger: services::intro_ledger::IntroLedger::new(db.clone()),
            guild_config: services::guild_config::GuildConfigStore::new(db),
            policy: policy::IntroPolicy::new(config.allowed_intro_posts),
            cache: cache::MessageCache::new(config.message_cache_size),
            guild_locks: guild_lock::GuildLocks::new(),
            config,
            report_footer,
            bot_id,
        }
    }
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

#[cfg(test)]
pub(crate) fn test_data() -> Data {
    Data::new(
        config::test_config(),
        db::test_db(),
        report::ReportFooter::default(),
        1,
    )
}
