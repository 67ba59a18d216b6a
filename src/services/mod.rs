pub mod guild_config;
pub mod intro_ledger;
